/// A counted security/observability event, 1:1 with [crate::error::ValidationErrorKind]
/// for every kind that can fail validation, plus a handful of non-error events
/// (cache hits/misses, token-created counters, and non-fatal warnings).
///
/// `#[repr(usize)]` with no explicit discriminants gives each variant a stable
/// `0..COUNT` index in declaration order, used directly by [crate::monitor::SecurityCounter]
/// to index its atomic counter array.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(usize)]
pub enum EventType {
    TokenEmpty,
    TokenOversize,
    Malformed,
    JsonParseFailed,
    OversizeString,
    OversizeArray,
    DepthExceeded,
    JwksUriResolutionFailed,
    JwksLoadFailed,
    JwksJsonParseFailed,
    UnsupportedJwksType,
    /// A JWKS document carried more than the configured key limit. Non-fatal: the
    /// document is still accepted and all keys (including those beyond the limit)
    /// are kept.
    JwksKeySizeLimitExceeded,
    UnknownIssuer,
    IssuerNotHealthy,
    UnsupportedAlgorithm,
    UnsupportedCritical,
    AlgKeyMismatch,
    KeyNotFound,
    SignatureInvalid,
    MissingClaim,
    Expired,
    NotYetValid,
    AudienceMismatch,
    AzpMismatch,
    IssuerMismatch,
    TokenBuildFailed,
    /// Emitted once per missing element at validator construction, not per token.
    MissingRecommendedElement,
    CacheHit,
    CacheMiss,
    AccessTokenCreated,
    IdTokenCreated,
    RefreshTokenCreated,
    /// Internal cache corruption. Never surfaced to callers; the cache entry is
    /// discarded and validation proceeds as a miss.
    InternalCacheError,
}

impl EventType {
    /// Total number of [EventType] variants, used to size the counter array.
    pub const COUNT: usize = (EventType::InternalCacheError as usize) + 1;

    /// This variant's stable index, used to address [crate::monitor::SecurityCounter]'s
    /// atomic counter array.
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_in_bounds() {
        assert_eq!(EventType::TokenEmpty.index(), 0);
        assert!(EventType::InternalCacheError.index() < EventType::COUNT);
        assert!(EventType::RefreshTokenCreated.index() < EventType::COUNT);
    }
}
