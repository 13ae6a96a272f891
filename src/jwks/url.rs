use reqwest::IntoUrl;
use serde::*;

/// Where a [crate::jwks::JwksLoader] fetches its JWKS document from.
#[derive(Clone, derive_more::Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JwksUrl {
    /// Discover the JWKS URL through an OIDC provider metadata document
    /// (`metadata["jwks_uri"]`, see <https://openid.net/specs/openid-connect-discovery-1_0.html#ProviderMetadata>).
    Discover(#[debug("{}", _0)] url::Url),

    /// A direct JWKS URL.
    Direct(#[debug("{}", _0)] url::Url),
}

impl JwksUrl {
    /// Attempts to create a [JwksUrl::Discover] from the given value.
    pub fn discover<T>(value: T) -> Result<JwksUrl, reqwest::Error>
    where
        T: IntoUrl,
    {
        Ok(JwksUrl::Discover(value.into_url()?))
    }

    /// Attempts to create a [JwksUrl::Direct] from the given value.
    pub fn direct<T>(value: T) -> Result<JwksUrl, reqwest::Error>
    where
        T: IntoUrl,
    {
        Ok(JwksUrl::Direct(value.into_url()?))
    }
}

impl AsRef<url::Url> for JwksUrl {
    fn as_ref(&self) -> &url::Url {
        match self {
            JwksUrl::Discover(uri) => uri,
            JwksUrl::Direct(uri) => uri,
        }
    }
}
