use crate::jwks::JwksUrl;
use backoff_config::{BackoffConfig, ExponentialBackoffConfig};
use serde::Deserialize;
use std::time::Duration;

/// Configuration for a single issuer's [crate::jwks::JwksLoader].
#[derive(Debug, Clone, Deserialize, PartialEq, bon::Builder)]
pub struct JwksLoaderConfig {
    /// Where to fetch the JWKS from.
    pub jwks_url: JwksUrl,

    /// Backoff applied across retries within a single fetch attempt cycle.
    #[serde(default = "default_backoff")]
    #[builder(default = default_backoff())]
    pub backoff: BackoffConfig,

    /// Periodic refresh cadence. Refresh is driven by this timer, never by reader traffic.
    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    #[builder(default = default_refresh_interval())]
    pub refresh_interval: Duration,

    /// Per-attempt HTTP timeout.
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    #[builder(default = default_fetch_timeout())]
    pub fetch_timeout: Duration,

    /// Reject JWKS documents larger than this many bytes.
    #[serde(default = "default_max_jwks_bytes")]
    #[builder(default = default_max_jwks_bytes())]
    pub max_jwks_bytes: usize,

    /// Keys beyond this count still load (with a warning event), never rejected.
    #[serde(default = "default_max_jwks_keys")]
    #[builder(default = default_max_jwks_keys())]
    pub max_jwks_keys: usize,
}

/// Bounded exponential backoff, `jwks_retry_max_attempts` default of 3.
pub fn default_backoff() -> BackoffConfig {
    ExponentialBackoffConfig {
        initial_delay: Duration::from_millis(200),
        factor: 2.0,
        max_delay: Duration::from_secs(10),
        max_retries: 3,
        max_total_delay: Duration::from_secs(30),
        jitter_enabled: true,
        jitter_seed: None,
    }
    .into()
}

pub const fn default_refresh_interval() -> Duration {
    Duration::from_secs(60)
}

pub const fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

pub const fn default_max_jwks_bytes() -> usize {
    256 * 1024
}

pub const fn default_max_jwks_keys() -> usize {
    50
}
