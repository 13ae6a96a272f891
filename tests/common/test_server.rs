use crate::common::test_server_response::TestServerResponse;
use crate::common::test_server_state::TestServerState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router};
use jwt_validator::jwks::JwksUrl;
use jsonwebtoken::jwk::JwkSet;
use serde_json::json;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// In-process HTTP server emulating an OIDC provider's well-known metadata and JWKS
/// endpoints, plus ETag-aware conditional responses for `304` testing.
#[derive(Clone)]
pub struct TestServer {
    pub state: Arc<RwLock<TestServerState>>,
}

impl TestServer {
    pub fn new() -> TestServer {
        TestServer {
            state: Arc::new(RwLock::new(TestServerState::empty())),
        }
    }

    pub fn set_oidc_provider_metadata_response(&self, response: TestServerResponse<Json<serde_json::Value>>) {
        self.state.write().unwrap().oidc_provider_metadata_response = response;
    }

    pub fn set_jwks_response(&self, response: TestServerResponse<Json<serde_json::Value>>) {
        self.state.write().unwrap().jwks_response = response;
    }

    /// Starts the stub server with the given `jwks` served (without an ETag by default),
    /// returning both a `discover` and `direct` [JwksUrl] pointing at it.
    pub async fn start(&self, jwks: JwkSet) -> anyhow::Result<TestServerUris> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let url = url::Url::parse(&format!("http://{}", listener.local_addr()?))?;

        tokio::spawn({
            let state = self.state.clone();
            async move {
                axum::serve(
                    listener,
                    Router::new()
                        .route("/metadata", axum::routing::get(Self::get_metadata))
                        .route("/jwks", axum::routing::get(Self::get_jwks))
                        .route("/health_check", axum::routing::get(Self::health_check))
                        .with_state(state),
                )
                .await
                .expect("failed to start test server");
            }
        });

        let mut health_check_url = url.clone();
        health_check_url.set_path("/health_check");
        let mut interval = tokio::time::interval(Duration::from_millis(50));
        while reqwest::get(health_check_url.clone()).await.is_err() {
            interval.tick().await;
        }

        let mut discover_jwks_url = url.clone();
        discover_jwks_url.set_path("/metadata");

        let mut direct_jwks_url = url.clone();
        direct_jwks_url.set_path("/jwks");

        let oidc_metadata = json!({ "jwks_uri": direct_jwks_url.as_str() });
        self.set_oidc_provider_metadata_response(TestServerResponse::success(Json(oidc_metadata)));
        self.set_jwks_response(TestServerResponse::success(Json(serde_json::to_value(jwks)?)));

        Ok(TestServerUris {
            discover_jwks_url: JwksUrl::Discover(discover_jwks_url),
            direct_jwks_url: JwksUrl::Direct(direct_jwks_url),
        })
    }

    async fn get_metadata(State(state): State<Arc<RwLock<TestServerState>>>) -> impl IntoResponse {
        state.read().unwrap().clone().oidc_provider_metadata_response.into_response()
    }

    async fn get_jwks(State(state): State<Arc<RwLock<TestServerState>>>, headers: HeaderMap) -> impl IntoResponse {
        let response = state.read().unwrap().clone().jwks_response;

        if let TestServerResponse::Success { etag: Some(etag), .. } = &response {
            if headers.get(axum::http::header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) == Some(etag.as_str()) {
                return TestServerResponse::<Json<serde_json::Value>>::NotModified.into_response();
            }
        }

        response.into_response()
    }

    async fn health_check() -> impl IntoResponse {
        StatusCode::OK
    }
}

pub struct TestServerUris {
    pub discover_jwks_url: JwksUrl,
    pub direct_jwks_url: JwksUrl,
}
