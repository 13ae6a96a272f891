use crate::common::test_server_response::TestServerResponse;
use axum::Json;
use reqwest::StatusCode;

/// State of the [crate::common::TestServer] with OIDC provider metadata / JWKS responses.
#[derive(Clone)]
pub struct TestServerState {
    pub oidc_provider_metadata_response: TestServerResponse<Json<serde_json::Value>>,
    pub jwks_response: TestServerResponse<Json<serde_json::Value>>,
}

impl TestServerState {
    /// An empty [TestServerState] that fails each request with `404`.
    pub fn empty() -> TestServerState {
        TestServerState {
            oidc_provider_metadata_response: TestServerResponse::Failure(StatusCode::NOT_FOUND),
            jwks_response: TestServerResponse::Failure(StatusCode::NOT_FOUND),
        }
    }
}
