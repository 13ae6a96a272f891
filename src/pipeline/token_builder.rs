use crate::error::{ValidationError, ValidationErrorKind};
use crate::issuer::IssuerConfig;
use crate::monitor::SecurityEventCounter;
use crate::pipeline::ClaimMapper;
use crate::token::{AccessTokenContent, ClaimValue, DecodedJwt, IdTokenContent, RefreshTokenContent};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Constructs typed [crate::token::TokenContent] from a [DecodedJwt]'s payload, dispatching
/// each claim through [ClaimMapper]. Runs after signature verification but before claim
/// policy validation.
pub struct TokenBuilder;

impl TokenBuilder {
    pub fn new() -> TokenBuilder {
        TokenBuilder
    }

    pub fn build_access_token(
        &self,
        decoded: &DecodedJwt,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<AccessTokenContent, ValidationError> {
        let payload = self.require_payload(decoded, counter)?;
        let claims = self.map_claims(payload, issuer_config);

        let subject = claims
            .get("sub")
            .and_then(ClaimValue::as_str)
            .map(String::from)
            .unwrap_or_default();

        let scopes = scope_list(payload);
        let roles = claims.get("roles").and_then(ClaimValue::as_string_list).map(Vec::from).unwrap_or_default();
        let authorized_party = payload.get("azp").and_then(Value::as_str).map(String::from);
        let audience = string_or_list(payload.get("aud"));

        let expires_at = self.require_expires_at(payload, counter)?;

        Ok(AccessTokenContent {
            subject,
            scopes,
            roles,
            authorized_party,
            audience,
            expires_at,
            claims,
            raw: decoded.raw.clone(),
        })
    }

    pub fn build_id_token(
        &self,
        decoded: &DecodedJwt,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<IdTokenContent, ValidationError> {
        let payload = self.require_payload(decoded, counter)?;
        let claims = self.map_claims(payload, issuer_config);

        let subject = claims
            .get("sub")
            .and_then(ClaimValue::as_str)
            .map(String::from)
            .ok_or_else(|| self.build_failed(counter))?;

        let audience = string_or_list(payload.get("aud"));
        let nonce = payload.get("nonce").and_then(Value::as_str).map(String::from);
        let expires_at = self.require_expires_at(payload, counter)?;

        Ok(IdTokenContent {
            subject,
            audience,
            nonce,
            expires_at,
            claims,
            raw: decoded.raw.clone(),
        })
    }

    /// Builds a [RefreshTokenContent]. For an opaque token (`decoded.payload.is_none()`)
    /// this always succeeds with an empty claim map.
    pub fn build_refresh_token(&self, decoded: &DecodedJwt, issuer_config: &IssuerConfig) -> RefreshTokenContent {
        let claims = match &decoded.payload {
            Some(payload) => self.map_claims(payload, issuer_config),
            None => HashMap::new(),
        };

        RefreshTokenContent {
            claims,
            raw: decoded.raw.clone(),
        }
    }

    fn require_payload<'a>(
        &self,
        decoded: &'a DecodedJwt,
        counter: &SecurityEventCounter,
    ) -> Result<&'a HashMap<String, Value>, ValidationError> {
        decoded.payload.as_ref().ok_or_else(|| self.build_failed(counter))
    }

    fn require_expires_at(
        &self,
        payload: &HashMap<String, Value>,
        counter: &SecurityEventCounter,
    ) -> Result<DateTime<Utc>, ValidationError> {
        payload
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| {
                counter.increment(ValidationErrorKind::MissingClaim.event_type());
                ValidationError::new(ValidationErrorKind::MissingClaim, "missing or invalid exp claim")
            })
    }

    fn map_claims(&self, payload: &HashMap<String, Value>, issuer_config: &IssuerConfig) -> HashMap<String, ClaimValue> {
        payload
            .iter()
            .map(|(name, value)| {
                let kind = ClaimMapper::kind_for(name, issuer_config);
                (name.clone(), ClaimMapper::map(kind, value, payload))
            })
            .collect()
    }

    fn build_failed(&self, counter: &SecurityEventCounter) -> ValidationError {
        counter.increment(ValidationErrorKind::TokenBuildFailed.event_type());
        ValidationError::new(ValidationErrorKind::TokenBuildFailed, "token payload is missing or malformed")
    }
}

impl Default for TokenBuilder {
    fn default() -> TokenBuilder {
        TokenBuilder::new()
    }
}

fn scope_list(payload: &HashMap<String, Value>) -> Vec<String> {
    match payload.get("scope") {
        Some(Value::String(s)) => s.split_whitespace().map(String::from).collect(),
        Some(Value::Array(_)) => string_or_list(payload.get("scope")),
        _ => string_or_list(payload.get("scp")),
    }
}

fn string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    }
}
