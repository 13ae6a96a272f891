use crate::cache::AccessTokenCacheConfig;
use crate::issuer::IssuerConfigInput;
use crate::monitor::MonitorConfig;
use crate::pipeline::ParserLimits;
use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration for a [crate::Validator], assembling per-issuer policy with
/// the ambient token-size, clock-skew, cache, and monitor knobs. Built either via
/// [bon::Builder] in code or deserialized wholesale (e.g. from a `figment`-assembled
/// file/env layer).
#[derive(Debug, Clone, Deserialize, bon::Builder)]
pub struct ValidatorConfig {
    /// One entry per trusted issuer. Duplicate `issuer_identifier`s are rejected at
    /// [crate::issuer::IssuerCatalog] construction time.
    pub issuers: Vec<IssuerConfigInput>,

    /// Hard upper bound on a raw token's length, enforced before any parsing.
    #[serde(default = "default_max_token_size")]
    #[builder(default = default_max_token_size())]
    pub max_token_size: usize,

    /// Tolerance applied to `exp`/`nbf`/`iat` comparisons against wall-clock time.
    #[serde(
        default = "default_clock_skew",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    #[builder(default = default_clock_skew())]
    pub clock_skew: Duration,

    /// Bounds enforced while splitting and JSON-decoding a compact JWS.
    #[serde(default)]
    #[builder(default)]
    pub parser_limits: ParserLimits,

    /// Access-token cache sizing and sweep cadence. `max_size: 0` disables it entirely.
    #[serde(default)]
    #[builder(default)]
    pub cache: AccessTokenCacheConfig,

    /// Which [crate::monitor::MeasurementType]s record samples.
    #[serde(default)]
    #[builder(default)]
    pub monitor: MonitorConfig,
}

pub const fn default_max_token_size() -> usize {
    8192
}

pub const fn default_clock_skew() -> Duration {
    Duration::from_secs(60)
}
