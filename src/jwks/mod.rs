mod fetch_error;
mod jwk_key;
mod loader;
mod loader_config;
mod loader_status;
mod oidc_metadata;
mod snapshot;
mod url;

pub use fetch_error::JwksFetchError;
pub use jwk_key::{JwkKey, JwkMaterial};
pub use loader::JwksLoader;
pub use loader_config::JwksLoaderConfig;
pub use loader_status::LoaderStatus;
pub use oidc_metadata::OidcProviderMetadataResponse;
pub use snapshot::JwksSnapshot;
pub use url::JwksUrl;
