use crate::error::{ValidationError, ValidationErrorKind};
use crate::monitor::SecurityEventCounter;

/// Rejects obviously-invalid input before any parsing or crypto: the only early-failure
/// path whose rejections short-circuit before every other pipeline step even runs.
pub struct PrePipelineValidator {
    max_token_size: usize,
}

impl PrePipelineValidator {
    pub fn new(max_token_size: usize) -> PrePipelineValidator {
        PrePipelineValidator { max_token_size }
    }

    /// Rejects null/empty input (`TOKEN_EMPTY`) or input exceeding `max_token_size`
    /// (`TOKEN_OVERSIZE`). Touches no crypto or JSON.
    pub fn validate(
        &self,
        raw: &str,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        if raw.trim().is_empty() {
            counter.increment(ValidationErrorKind::TokenEmpty.event_type());
            return Err(ValidationError::new(ValidationErrorKind::TokenEmpty, "token is empty"));
        }

        if raw.len() > self.max_token_size {
            counter.increment(ValidationErrorKind::TokenOversize.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::TokenOversize,
                format!("token length {} exceeds max_token_size {}", raw.len(), self.max_token_size),
            ));
        }

        Ok(())
    }
}
