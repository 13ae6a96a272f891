use crate::jwks::{JwksLoader, JwksLoaderConfig};
use crate::monitor::{EventType, Monitor, SecurityEventCounter};
use crate::token::ClaimMapperKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Declarative, deserializable description of a single trusted issuer. Frozen into an
/// [IssuerConfig] (which additionally owns a live [JwksLoader]) by [crate::issuer::IssuerCatalog].
#[derive(Debug, Clone, Deserialize, PartialEq, bon::Builder)]
pub struct IssuerConfigInput {
    /// Exact-match value against the token's `iss` claim. Must be non-empty.
    pub issuer_identifier: String,

    /// Expected audiences. Empty disables the check for access tokens; ID tokens always
    /// require a non-empty intersection regardless of this list being empty.
    #[serde(default)]
    #[builder(default)]
    pub expected_audience: Vec<String>,

    /// Expected `azp` client id. `None` skips the `azp` check entirely.
    #[serde(default)]
    #[builder(default)]
    pub expected_client_id: Option<String>,

    /// Ordered algorithm preferences. `none` is never allowed regardless of this list.
    #[serde(default = "default_signature_algorithms")]
    #[builder(default = default_signature_algorithms())]
    pub signature_algorithms: Vec<String>,

    /// Per-claim overrides of the pipeline's default mapper dispatch table.
    #[serde(default)]
    #[builder(default)]
    pub claim_mapping_overrides: HashMap<String, ClaimMapperKind>,

    /// Acceptable header `typ` values; an absent `typ` is always accepted.
    #[serde(default = "default_allowed_token_types")]
    #[builder(default = default_allowed_token_types())]
    pub allowed_token_types: Vec<String>,

    /// Configuration for this issuer's [JwksLoader].
    pub jwks: JwksLoaderConfig,
}

pub fn default_signature_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

pub fn default_allowed_token_types() -> Vec<String> {
    vec!["JWT".to_string(), "at+jwt".to_string(), "id+jwt".to_string()]
}

/// A frozen, validated issuer configuration paired with a live [JwksLoader]. Built once by
/// [crate::issuer::IssuerCatalog::build] and never mutated afterward.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    pub issuer_identifier: String,
    pub expected_audience: Vec<String>,
    pub expected_client_id: Option<String>,
    pub signature_algorithms: Vec<String>,
    pub claim_mapping_overrides: HashMap<String, ClaimMapperKind>,
    pub allowed_token_types: Vec<String>,
    pub jwks_loader: Arc<JwksLoader>,
}

impl IssuerConfig {
    /// Builds an [IssuerConfig] from the given `input`, constructing (but not starting) its
    /// [JwksLoader] and emitting [EventType::MissingRecommendedElement] once per missing
    /// `expected_audience`/`expected_client_id`. This warning is a construction-time
    /// event, independent of token traffic.
    pub(crate) fn new(
        input: IssuerConfigInput,
        http_client: reqwest::Client,
        counter: Arc<SecurityEventCounter>,
        monitor: Arc<Monitor>,
    ) -> Result<IssuerConfig, crate::error::IssuerConfigError> {
        if input.issuer_identifier.trim().is_empty() {
            return Err(crate::error::IssuerConfigError::EmptyIssuerIdentifier);
        }

        if input.expected_audience.is_empty() {
            counter.increment(EventType::MissingRecommendedElement);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                issuer = %input.issuer_identifier,
                "no expected_audience configured for issuer"
            );
        }

        if input.expected_client_id.is_none() {
            counter.increment(EventType::MissingRecommendedElement);
            #[cfg(feature = "tracing")]
            tracing::warn!(
                issuer = %input.issuer_identifier,
                "no expected_client_id configured for issuer"
            );
        }

        let jwks_loader = Arc::new(JwksLoader::new(
            input.issuer_identifier.clone(),
            http_client,
            input.jwks,
            counter.clone(),
            monitor,
        ));

        Ok(IssuerConfig {
            issuer_identifier: input.issuer_identifier,
            expected_audience: input.expected_audience,
            expected_client_id: input.expected_client_id,
            signature_algorithms: input.signature_algorithms,
            claim_mapping_overrides: input.claim_mapping_overrides,
            allowed_token_types: input.allowed_token_types,
            jwks_loader,
        })
    }
}
