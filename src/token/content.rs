use crate::token::ClaimValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Typed content of a successfully validated access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessTokenContent {
    pub subject: String,
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
    pub authorized_party: Option<String>,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,

    /// Every claim from the payload, identity-mapped unless a dedicated
    /// [crate::pipeline::ClaimMapper] applies. Owns its data so it can key the cache.
    pub claims: HashMap<String, ClaimValue>,

    /// The original compact token string. Owned so it can key the access token cache.
    pub raw: String,
}

/// Typed content of a successfully validated ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct IdTokenContent {
    pub subject: String,
    /// Mandatory for ID tokens (unlike [AccessTokenContent::audience]).
    pub audience: Vec<String>,
    pub nonce: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub claims: HashMap<String, ClaimValue>,
    pub raw: String,
}

/// Typed content of a refresh token. If the token is JWS-shaped, `claims` holds its
/// decoded payload; if opaque, `claims` is empty. `raw` is always populated.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTokenContent {
    pub claims: HashMap<String, ClaimValue>,
    pub raw: String,
}

/// The outcome of [crate::Validator]'s three token-kind operations, used internally
/// to dispatch counters and cache behavior uniformly across kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenContent {
    Access(AccessTokenContent),
    Id(IdTokenContent),
    Refresh(RefreshTokenContent),
}
