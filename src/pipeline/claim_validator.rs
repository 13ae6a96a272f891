use crate::error::{ValidationError, ValidationErrorKind};
use crate::issuer::IssuerConfig;
use crate::monitor::SecurityEventCounter;
use crate::token::TokenKind;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Per-call carrier for "now" and clock-skew tolerance, captured once per validation (not
/// per claim) so every check in a single call agrees on the current instant.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub now: DateTime<Utc>,
    pub clock_skew: Duration,
}

impl ValidationContext {
    pub fn new(now: DateTime<Utc>, clock_skew: Duration) -> ValidationContext {
        ValidationContext { now, clock_skew }
    }
}

/// Enforces the per-kind claim policy table, run after signature verification.
pub struct ClaimValidator;

impl ClaimValidator {
    pub fn new() -> ClaimValidator {
        ClaimValidator
    }

    pub fn validate(
        &self,
        kind: TokenKind,
        payload: &HashMap<String, Value>,
        issuer_config: &IssuerConfig,
        ctx: &ValidationContext,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        if kind != TokenKind::Refresh {
            self.check_iss(payload, issuer_config, counter)?;
            self.check_sub(payload, counter)?;
            self.check_aud(kind, payload, issuer_config, counter)?;
        }

        if kind == TokenKind::Access {
            self.check_azp(payload, issuer_config, counter)?;
        }

        self.check_exp(kind, payload, ctx, counter)?;
        self.check_nbf(payload, ctx, counter)?;
        self.check_iat(payload, ctx, counter)?;

        Ok(())
    }

    fn check_iss(
        &self,
        payload: &HashMap<String, Value>,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        match payload.get("iss").and_then(Value::as_str) {
            Some(iss) if iss == issuer_config.issuer_identifier => Ok(()),
            Some(_) => {
                counter.increment(ValidationErrorKind::IssuerMismatch.event_type());
                Err(ValidationError::new(ValidationErrorKind::IssuerMismatch, "iss claim does not match resolved issuer"))
            }
            None => {
                counter.increment(ValidationErrorKind::MissingClaim.event_type());
                Err(ValidationError::new(ValidationErrorKind::MissingClaim, "missing iss claim"))
            }
        }
    }

    fn check_sub(&self, payload: &HashMap<String, Value>, counter: &SecurityEventCounter) -> Result<(), ValidationError> {
        // Empty-string `sub` is accepted: preserved per documented current behavior.
        match payload.get("sub") {
            Some(Value::String(_)) => Ok(()),
            _ => {
                counter.increment(ValidationErrorKind::MissingClaim.event_type());
                Err(ValidationError::new(ValidationErrorKind::MissingClaim, "missing sub claim"))
            }
        }
    }

    fn check_aud(
        &self,
        kind: TokenKind,
        payload: &HashMap<String, Value>,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let token_aud = extract_string_or_list(payload.get("aud"));

        match kind {
            TokenKind::Id => {
                if token_aud.is_empty() || !intersects(&token_aud, &issuer_config.expected_audience) {
                    counter.increment(ValidationErrorKind::AudienceMismatch.event_type());
                    return Err(ValidationError::new(
                        ValidationErrorKind::AudienceMismatch,
                        "aud does not intersect the issuer's expected audience",
                    ));
                }
                Ok(())
            }
            TokenKind::Access => {
                if issuer_config.expected_audience.is_empty() || payload.get("aud").is_none() {
                    return Ok(());
                }
                if !intersects(&token_aud, &issuer_config.expected_audience) {
                    counter.increment(ValidationErrorKind::AudienceMismatch.event_type());
                    return Err(ValidationError::new(
                        ValidationErrorKind::AudienceMismatch,
                        "aud does not intersect the issuer's expected audience",
                    ));
                }
                Ok(())
            }
            TokenKind::Refresh => Ok(()),
        }
    }

    fn check_azp(
        &self,
        payload: &HashMap<String, Value>,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let Some(expected) = &issuer_config.expected_client_id else {
            return Ok(());
        };

        match payload.get("azp").and_then(Value::as_str) {
            Some(azp) if azp == expected => Ok(()),
            Some(_) => {
                counter.increment(ValidationErrorKind::AzpMismatch.event_type());
                Err(ValidationError::new(ValidationErrorKind::AzpMismatch, "azp does not match expected_client_id"))
            }
            None => {
                counter.increment(ValidationErrorKind::AzpMismatch.event_type());
                Err(ValidationError::new(ValidationErrorKind::AzpMismatch, "missing azp claim"))
            }
        }
    }

    fn check_exp(
        &self,
        kind: TokenKind,
        payload: &HashMap<String, Value>,
        ctx: &ValidationContext,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let exp = match payload.get("exp").and_then(Value::as_i64) {
            Some(exp) => exp,
            None if kind == TokenKind::Refresh => return Ok(()),
            None => {
                counter.increment(ValidationErrorKind::MissingClaim.event_type());
                return Err(ValidationError::new(ValidationErrorKind::MissingClaim, "missing exp claim"));
            }
        };

        let skew = ctx.clock_skew.as_secs() as i64;
        if ctx.now.timestamp() > exp + skew {
            counter.increment(ValidationErrorKind::Expired.event_type());
            return Err(ValidationError::new(ValidationErrorKind::Expired, "token is expired"));
        }

        Ok(())
    }

    fn check_nbf(
        &self,
        payload: &HashMap<String, Value>,
        ctx: &ValidationContext,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let Some(nbf) = payload.get("nbf").and_then(Value::as_i64) else {
            return Ok(());
        };

        let skew = ctx.clock_skew.as_secs() as i64;
        if ctx.now.timestamp() + skew < nbf {
            counter.increment(ValidationErrorKind::NotYetValid.event_type());
            return Err(ValidationError::new(ValidationErrorKind::NotYetValid, "token is not yet valid"));
        }

        Ok(())
    }

    fn check_iat(
        &self,
        payload: &HashMap<String, Value>,
        ctx: &ValidationContext,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let Some(iat) = payload.get("iat").and_then(Value::as_i64) else {
            return Ok(());
        };

        let skew = ctx.clock_skew.as_secs() as i64;
        if iat > ctx.now.timestamp() + skew {
            counter.increment(ValidationErrorKind::NotYetValid.event_type());
            return Err(ValidationError::new(ValidationErrorKind::NotYetValid, "iat is in the future"));
        }

        Ok(())
    }
}

impl Default for ClaimValidator {
    fn default() -> ClaimValidator {
        ClaimValidator::new()
    }
}

fn extract_string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    }
}

fn intersects(a: &[String], b: &[String]) -> bool {
    a.iter().any(|x| b.iter().any(|y| y == x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::IssuerConfigInput;
    use crate::jwks::JwksUrl;
    use crate::monitor::{Monitor, MonitorConfig};
    use std::sync::Arc;

    fn issuer_config(expected_audience: Vec<String>, expected_client_id: Option<String>) -> IssuerConfig {
        let input = IssuerConfigInput::builder()
            .issuer_identifier("https://idp/")
            .expected_audience(expected_audience)
            .maybe_expected_client_id(expected_client_id)
            .jwks(
                crate::jwks::JwksLoaderConfig::builder()
                    .jwks_url(JwksUrl::direct("https://idp/jwks").unwrap())
                    .build(),
            )
            .build();

        let counter = Arc::new(SecurityEventCounter::new());
        let monitor = Arc::new(Monitor::new(MonitorConfig::default()));
        crate::issuer::IssuerConfig::new(input, reqwest::Client::new(), counter, monitor).unwrap()
    }

    #[test]
    fn expired_token_is_rejected_past_skew() {
        let issuer = issuer_config(vec!["api".into()], Some("c1".into()));
        let validator = ClaimValidator::new();
        let counter = SecurityEventCounter::new();
        let now = Utc::now();

        let mut payload = HashMap::new();
        payload.insert("iss".to_string(), Value::String("https://idp/".into()));
        payload.insert("sub".to_string(), Value::String("u1".into()));
        payload.insert("aud".to_string(), Value::String("api".into()));
        payload.insert("azp".to_string(), Value::String("c1".into()));
        payload.insert("exp".to_string(), Value::from(now.timestamp() - 61));

        let ctx = ValidationContext::new(now, Duration::from_secs(60));
        let err = validator.validate(TokenKind::Access, &payload, &issuer, &ctx, &counter).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Expired);
    }

    #[test]
    fn expired_within_skew_is_accepted() {
        let issuer = issuer_config(vec!["api".into()], Some("c1".into()));
        let validator = ClaimValidator::new();
        let counter = SecurityEventCounter::new();
        let now = Utc::now();

        let mut payload = HashMap::new();
        payload.insert("iss".to_string(), Value::String("https://idp/".into()));
        payload.insert("sub".to_string(), Value::String("u1".into()));
        payload.insert("aud".to_string(), Value::String("api".into()));
        payload.insert("azp".to_string(), Value::String("c1".into()));
        payload.insert("exp".to_string(), Value::from(now.timestamp() - 1));

        let ctx = ValidationContext::new(now, Duration::from_secs(60));
        assert!(validator.validate(TokenKind::Access, &payload, &issuer, &ctx, &counter).is_ok());
    }

    #[test]
    fn refresh_tokens_skip_iss_sub_aud_azp() {
        let issuer = issuer_config(vec![], None);
        let validator = ClaimValidator::new();
        let counter = SecurityEventCounter::new();
        let now = Utc::now();
        let payload = HashMap::new();

        let ctx = ValidationContext::new(now, Duration::from_secs(60));
        assert!(validator.validate(TokenKind::Refresh, &payload, &issuer, &ctx, &counter).is_ok());
    }
}
