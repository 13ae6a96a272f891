use crate::common::{AUD, CLIENT_ID, ISS};
use jwt_validator::config::ValidatorConfig;
use jwt_validator::issuer::IssuerConfigInput;
use jwt_validator::jwks::{JwksLoaderConfig, JwksUrl};

/// A single-issuer [ValidatorConfig] with a short refresh interval, suited to tests that
/// wait for the loader's first background fetch.
pub fn default_config(jwks_url: JwksUrl) -> ValidatorConfig {
    ValidatorConfig::builder()
        .issuers(vec![
            IssuerConfigInput::builder()
                .issuer_identifier(ISS)
                .expected_audience(vec![AUD.to_string()])
                .expected_client_id(CLIENT_ID.to_string())
                .jwks(
                    JwksLoaderConfig::builder()
                        .jwks_url(jwks_url)
                        .refresh_interval(std::time::Duration::from_millis(50))
                        .build(),
                )
                .build(),
        ])
        .build()
}
