use serde::Deserialize;
use std::time::Duration;

/// Configuration for [crate::cache::AccessTokenCache].
#[derive(Debug, Clone, Deserialize, PartialEq, bon::Builder)]
pub struct AccessTokenCacheConfig {
    /// Bounds the cache by entry count. `0` disables caching entirely: all operations
    /// become no-ops.
    #[serde(default = "default_max_size")]
    #[builder(default = default_max_size())]
    pub max_size: usize,

    /// Cadence of the periodic sweep that removes entries whose `exp < now - skew`.
    #[serde(
        default = "default_eviction_interval",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    #[builder(default = default_eviction_interval())]
    pub eviction_interval: Duration,
}

impl Default for AccessTokenCacheConfig {
    fn default() -> AccessTokenCacheConfig {
        AccessTokenCacheConfig {
            max_size: default_max_size(),
            eviction_interval: default_eviction_interval(),
        }
    }
}

pub const fn default_max_size() -> usize {
    1000
}

pub const fn default_eviction_interval() -> Duration {
    Duration::from_secs(300)
}
