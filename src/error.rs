use crate::monitor::EventType;
use thiserror::Error as ThisError;

/// A kind of [ValidationError], 1:1 with an [EventType] via [ValidationErrorKind::event_type].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ValidationErrorKind {
    /// Input was null, empty, or blank.
    TokenEmpty,
    /// Input exceeded `max_token_size`.
    TokenOversize,
    /// Input did not split into exactly three JWS segments (or one opaque segment).
    Malformed,
    /// A header/payload segment did not decode to valid JSON.
    JsonParseFailed,
    /// A JSON string value exceeded the configured per-string limit.
    OversizeString,
    /// A JSON array exceeded the configured element-count limit.
    OversizeArray,
    /// JSON nesting exceeded the configured depth limit.
    DepthExceeded,
    /// The OIDC well-known document could not be fetched/parsed, or lacked `jwks_uri`.
    JwksUriResolutionFailed,
    /// The JWKS endpoint could not be reached after exhausting retries.
    JwksLoadFailed,
    /// The JWKS response body was not valid JSON / did not match the expected schema.
    JwksJsonParseFailed,
    /// A JWK entry had a `kty` outside `{RSA, EC, OKP}` that could not be used.
    UnsupportedJwksType,
    /// No [crate::issuer::IssuerConfig] matches the token's `iss` claim.
    UnknownIssuer,
    /// The matched issuer's [crate::jwks::JwksLoader] is not currently `Ok`.
    IssuerNotHealthy,
    /// The header's `alg` is not in the issuer's configured preferences, or is `none`.
    UnsupportedAlgorithm,
    /// The header's `crit` extension list named an extension this crate does not understand.
    UnsupportedCritical,
    /// The header's `alg` does not match the resolved key's algorithm class.
    AlgKeyMismatch,
    /// No JWK matching the header's `kid` (or the sole available key) was found.
    KeyNotFound,
    /// Cryptographic signature verification failed.
    SignatureInvalid,
    /// A required claim was absent.
    MissingClaim,
    /// `now > exp + skew`.
    Expired,
    /// `now + skew < nbf`.
    NotYetValid,
    /// The token's `aud` does not intersect the issuer's expected audience.
    AudienceMismatch,
    /// The token's `azp` does not match the issuer's expected client id.
    AzpMismatch,
    /// The token's `iss` does not match the resolved issuer's identifier.
    IssuerMismatch,
    /// [crate::pipeline::TokenBuilder] failed to construct typed content from the payload.
    TokenBuildFailed,
}

impl ValidationErrorKind {
    /// Maps this [ValidationErrorKind] to its corresponding [EventType].
    pub const fn event_type(self) -> EventType {
        match self {
            ValidationErrorKind::TokenEmpty => EventType::TokenEmpty,
            ValidationErrorKind::TokenOversize => EventType::TokenOversize,
            ValidationErrorKind::Malformed => EventType::Malformed,
            ValidationErrorKind::JsonParseFailed => EventType::JsonParseFailed,
            ValidationErrorKind::OversizeString => EventType::OversizeString,
            ValidationErrorKind::OversizeArray => EventType::OversizeArray,
            ValidationErrorKind::DepthExceeded => EventType::DepthExceeded,
            ValidationErrorKind::JwksUriResolutionFailed => EventType::JwksUriResolutionFailed,
            ValidationErrorKind::JwksLoadFailed => EventType::JwksLoadFailed,
            ValidationErrorKind::JwksJsonParseFailed => EventType::JwksJsonParseFailed,
            ValidationErrorKind::UnsupportedJwksType => EventType::UnsupportedJwksType,
            ValidationErrorKind::UnknownIssuer => EventType::UnknownIssuer,
            ValidationErrorKind::IssuerNotHealthy => EventType::IssuerNotHealthy,
            ValidationErrorKind::UnsupportedAlgorithm => EventType::UnsupportedAlgorithm,
            ValidationErrorKind::UnsupportedCritical => EventType::UnsupportedCritical,
            ValidationErrorKind::AlgKeyMismatch => EventType::AlgKeyMismatch,
            ValidationErrorKind::KeyNotFound => EventType::KeyNotFound,
            ValidationErrorKind::SignatureInvalid => EventType::SignatureInvalid,
            ValidationErrorKind::MissingClaim => EventType::MissingClaim,
            ValidationErrorKind::Expired => EventType::Expired,
            ValidationErrorKind::NotYetValid => EventType::NotYetValid,
            ValidationErrorKind::AudienceMismatch => EventType::AudienceMismatch,
            ValidationErrorKind::AzpMismatch => EventType::AzpMismatch,
            ValidationErrorKind::IssuerMismatch => EventType::IssuerMismatch,
            ValidationErrorKind::TokenBuildFailed => EventType::TokenBuildFailed,
        }
    }
}

/// An error raised anywhere in the validation pipeline.
///
/// Carries a stable [ValidationErrorKind], the [EventType] it maps to (for metrics),
/// and a human-readable `detail` that MUST NOT contain the raw token. Any underlying
/// cause is available via `source` for logging, but is not part of `detail`.
#[derive(Debug, ThisError)]
#[error("{kind:?}: {detail}")]
pub struct ValidationError {
    /// The stable [ValidationErrorKind] of this error.
    pub kind: ValidationErrorKind,

    /// A human-readable detail message. MUST NOT contain the raw token.
    pub detail: String,

    /// An optional source of this error, for logging only.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ValidationError {
    /// Constructs a new [ValidationError] with no underlying source.
    pub fn new(kind: ValidationErrorKind, detail: impl Into<String>) -> ValidationError {
        ValidationError {
            kind,
            detail: detail.into(),
            source: None,
        }
    }

    /// Constructs a new [ValidationError] wrapping the given `source`.
    pub fn with_source(
        kind: ValidationErrorKind,
        detail: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> ValidationError {
        ValidationError {
            kind,
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The [EventType] this error maps to, for metrics.
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }
}

/// A non-validation error raised by [crate::cache::AccessTokenCache] on internal corruption.
///
/// Must never cause a token to be falsely accepted or rejected. Callers treat it as a
/// cache miss and proceed with full validation.
#[derive(Debug, ThisError)]
#[error("internal cache error: {0}")]
pub struct InternalCacheError(pub String);

/// A configuration-shape error raised while building an [crate::issuer::IssuerConfig] or
/// [crate::issuer::IssuerCatalog]. Distinct from [ValidationError]: this never occurs on a
/// token-validation path, only at startup while freezing configuration.
#[derive(Debug, ThisError)]
pub enum IssuerConfigError {
    #[error("issuer_identifier must be non-empty")]
    EmptyIssuerIdentifier,

    #[error("duplicate issuer_identifier: {0}")]
    DuplicateIssuerIdentifier(String),
}
