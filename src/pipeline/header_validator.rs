use crate::error::{ValidationError, ValidationErrorKind};
use crate::issuer::IssuerConfig;
use crate::monitor::SecurityEventCounter;
use crate::token::DecodedJwt;

/// Enforces header-level policy, run before signature verification so an unsupported
/// algorithm or unknown `crit` extension never reaches the crypto layer.
pub struct HeaderValidator;

impl HeaderValidator {
    pub fn new() -> HeaderValidator {
        HeaderValidator
    }

    /// Checks `typ` (absent or one of the issuer's `allowed_token_types`; a mismatch is
    /// reported as [ValidationErrorKind::UnsupportedCritical], the closest fit among the
    /// taxonomy's header errors for "declares something this validator doesn't accept"),
    /// `alg` (in the issuer's `signature_algorithms`, never `none`), and `crit` (any
    /// extension present fails, since this crate understands none).
    pub fn validate(
        &self,
        decoded: &DecodedJwt,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<String, ValidationError> {
        if let Some(typ) = decoded.header_typ() {
            if !issuer_config.allowed_token_types.iter().any(|t| t == typ) {
                counter.increment(ValidationErrorKind::UnsupportedCritical.event_type());
                return Err(ValidationError::new(
                    ValidationErrorKind::UnsupportedCritical,
                    format!("unsupported typ: {typ}"),
                ));
            }
        }

        if decoded.header.contains_key("crit") {
            counter.increment(ValidationErrorKind::UnsupportedCritical.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::UnsupportedCritical,
                "crit header extensions are not understood",
            ));
        }

        let alg = decoded.header_alg().ok_or_else(|| {
            counter.increment(ValidationErrorKind::UnsupportedAlgorithm.event_type());
            ValidationError::new(ValidationErrorKind::UnsupportedAlgorithm, "missing alg header")
        })?;

        if alg.eq_ignore_ascii_case("none") || !issuer_config.signature_algorithms.iter().any(|a| a == alg) {
            counter.increment(ValidationErrorKind::UnsupportedAlgorithm.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::UnsupportedAlgorithm,
                format!("alg {alg} is not among the issuer's configured preferences"),
            ));
        }

        Ok(alg.to_string())
    }
}

impl Default for HeaderValidator {
    fn default() -> HeaderValidator {
        HeaderValidator::new()
    }
}
