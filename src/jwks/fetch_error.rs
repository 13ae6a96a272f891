/// Errors that can occur while fetching a JWKS document, before any retry/backoff policy
/// is applied. [crate::jwks::JwksLoader] converts a final (post-retry) [JwksFetchError]
/// into a [crate::error::ValidationError] used only for logging; the loader itself never
/// surfaces this type to a validation caller.
#[derive(Debug, thiserror::Error)]
pub enum JwksFetchError {
    #[error("OIDC provider metadata request failed: {0}")]
    WellKnownRequestFailed(reqwest::Error),

    #[error("Invalid OIDC provider metadata response: {0}")]
    InvalidWellKnownResponse(reqwest::Error),

    #[error("JWKS request failed: {0}")]
    JwksRequestFailed(reqwest::Error),

    #[error("JWKS response exceeded the configured size limit ({actual_bytes} > {max_bytes} bytes)")]
    JwksResponseTooLarge { max_bytes: usize, actual_bytes: usize },

    #[error("Invalid JWKS response: {0}")]
    InvalidJwksResponse(#[from] serde_json::Error),
}

impl JwksFetchError {
    /// Whether this error originated from well-known document resolution, which maps to
    /// a distinct event type from a generic JWKS load failure.
    pub fn is_well_known_resolution_failure(&self) -> bool {
        matches!(
            self,
            JwksFetchError::WellKnownRequestFailed(_) | JwksFetchError::InvalidWellKnownResponse(_)
        )
    }

    /// Whether this error indicates the JWKS body failed to parse as expected JSON.
    pub fn is_json_parse_failure(&self) -> bool {
        matches!(self, JwksFetchError::InvalidJwksResponse(_))
    }
}
