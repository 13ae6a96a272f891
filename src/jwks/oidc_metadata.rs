use serde::*;

/// Minimum required structure of an OIDC provider metadata ("well-known") response.
/// Only `jwks_uri` is mandatory; `issuer` is carried for informational/logging purposes
/// but its absence is not a hard error.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OidcProviderMetadataResponse {
    pub jwks_uri: url::Url,
    #[serde(default)]
    pub issuer: Option<String>,
}
