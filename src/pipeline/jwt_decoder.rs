use crate::error::{ValidationError, ValidationErrorKind};
use crate::monitor::SecurityEventCounter;
use crate::token::{DecodedJwt, JwsSegments};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::HashMap;
use serde_json::Value;

/// Bounds enforced while splitting and JSON-parsing a compact JWS, so parsing adversarial
/// input never constructs an unbounded structure.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct ParserLimits {
    pub max_part_bytes: usize,
    pub max_json_string: usize,
    pub max_json_array: usize,
    pub max_json_depth: usize,
}

impl Default for ParserLimits {
    fn default() -> ParserLimits {
        ParserLimits {
            max_part_bytes: 8 * 1024,
            max_json_string: 4 * 1024,
            max_json_array: 64,
            max_json_depth: 10,
        }
    }
}

/// Splits a compact token into its base64url segments and JSON-decodes header/payload
/// under [ParserLimits]. Never constructs an unbounded structure from adversarial input.
pub struct JwtDecoder {
    limits: ParserLimits,
}

impl JwtDecoder {
    pub fn new(limits: ParserLimits) -> JwtDecoder {
        JwtDecoder { limits }
    }

    /// Decodes a JWS-shaped token: exactly three `.`-joined base64url segments. Fails with
    /// [ValidationErrorKind::Malformed] otherwise.
    pub fn decode(&self, raw: &str, counter: &SecurityEventCounter) -> Result<DecodedJwt, ValidationError> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 3 {
            counter.increment(ValidationErrorKind::Malformed.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::Malformed,
                "expected three base64url-encoded segments joined by '.'",
            ));
        }

        let header_bytes = self.decode_part(parts[0], counter)?;
        let payload_bytes = self.decode_part(parts[1], counter)?;

        let header = self.parse_bounded_object(&header_bytes, counter)?;
        let payload = self.parse_bounded_object(&payload_bytes, counter)?;

        let iss = payload.get("iss").and_then(Value::as_str).map(String::from);

        Ok(DecodedJwt {
            raw: raw.to_string(),
            segments: Some(JwsSegments {
                header: parts[0].to_string(),
                payload: parts[1].to_string(),
                signature: parts[2].to_string(),
            }),
            header,
            payload: Some(payload),
            iss,
        })
    }

    /// Yields an empty header/payload [DecodedJwt] without counting parse events, for the
    /// refresh-token path's opaque (non-JWS) tokens.
    pub fn decode_opaque(&self, raw: &str) -> DecodedJwt {
        DecodedJwt {
            raw: raw.to_string(),
            segments: None,
            header: HashMap::new(),
            payload: None,
            iss: None,
        }
    }

    fn decode_part(&self, part: &str, counter: &SecurityEventCounter) -> Result<Vec<u8>, ValidationError> {
        let bytes = URL_SAFE_NO_PAD.decode(part).map_err(|e| {
            counter.increment(ValidationErrorKind::Malformed.event_type());
            ValidationError::with_source(ValidationErrorKind::Malformed, "invalid base64url segment", e)
        })?;

        if bytes.len() > self.limits.max_part_bytes {
            counter.increment(ValidationErrorKind::Malformed.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::Malformed,
                format!("decoded segment length {} exceeds max_part_bytes {}", bytes.len(), self.limits.max_part_bytes),
            ));
        }

        Ok(bytes)
    }

    fn parse_bounded_object(
        &self,
        bytes: &[u8],
        counter: &SecurityEventCounter,
    ) -> Result<HashMap<String, Value>, ValidationError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            counter.increment(ValidationErrorKind::JsonParseFailed.event_type());
            ValidationError::with_source(ValidationErrorKind::JsonParseFailed, "invalid JSON", e)
        })?;

        self.check_bounds(&value, 0, counter)?;

        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => {
                counter.increment(ValidationErrorKind::JsonParseFailed.event_type());
                Err(ValidationError::new(ValidationErrorKind::JsonParseFailed, "expected a JSON object"))
            }
        }
    }

    fn check_bounds(&self, value: &Value, depth: usize, counter: &SecurityEventCounter) -> Result<(), ValidationError> {
        if depth > self.limits.max_json_depth {
            counter.increment(ValidationErrorKind::DepthExceeded.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::DepthExceeded,
                format!("JSON nesting exceeds max_json_depth {}", self.limits.max_json_depth),
            ));
        }

        match value {
            Value::String(s) if s.len() > self.limits.max_json_string => {
                counter.increment(ValidationErrorKind::OversizeString.event_type());
                Err(ValidationError::new(
                    ValidationErrorKind::OversizeString,
                    format!("JSON string length {} exceeds max_json_string {}", s.len(), self.limits.max_json_string),
                ))
            }
            Value::Array(items) => {
                if items.len() > self.limits.max_json_array {
                    counter.increment(ValidationErrorKind::OversizeArray.event_type());
                    return Err(ValidationError::new(
                        ValidationErrorKind::OversizeArray,
                        format!("JSON array length {} exceeds max_json_array {}", items.len(), self.limits.max_json_array),
                    ));
                }
                items.iter().try_for_each(|item| self.check_bounds(item, depth + 1, counter))
            }
            Value::Object(fields) => fields.values().try_for_each(|v| self.check_bounds(v, depth + 1, counter)),
            _ => Ok(()),
        }
    }
}
