use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const ISS: &str = "https://idp.example.test/";
pub const WRONG_ISS: &str = "https://wrong-idp.example.test/";
pub const AUD: &str = "https://api.example.test/";
pub const WRONG_AUD: &str = "https://wrong-api.example.test/";
pub const CLIENT_ID: &str = "test-client";
pub const WRONG_CLIENT_ID: &str = "wrong-client";

/// A JSON-serializable access token payload for tests. `scope` is a space-separated
/// string, matching the common OAuth2 wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAccessTokenClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    pub aud: Option<String>,
    pub azp: Option<String>,
    pub exp: Option<i64>,
    pub nbf: Option<i64>,
    pub scope: Option<String>,
}

impl TestAccessTokenClaims {
    pub fn valid() -> TestAccessTokenClaims {
        TestAccessTokenClaims {
            iss: Some(ISS.into()),
            sub: Some("user-1".into()),
            aud: Some(AUD.into()),
            azp: Some(CLIENT_ID.into()),
            exp: Some(Utc::now().timestamp() + 300),
            nbf: Some(Utc::now().timestamp() - 300),
            scope: Some("read write".into()),
        }
    }

    pub fn expired() -> TestAccessTokenClaims {
        let mut claims = TestAccessTokenClaims::valid();
        claims.exp = Some(Utc::now().timestamp() - 300);
        claims
    }

    pub fn invalid_iss() -> TestAccessTokenClaims {
        let mut claims = TestAccessTokenClaims::valid();
        claims.iss = Some(WRONG_ISS.into());
        claims
    }

    pub fn invalid_azp() -> TestAccessTokenClaims {
        let mut claims = TestAccessTokenClaims::valid();
        claims.azp = Some(WRONG_CLIENT_ID.into());
        claims
    }
}

/// A JSON-serializable ID token payload for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestIdTokenClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    pub aud: Option<String>,
    pub exp: Option<i64>,
    pub nbf: Option<i64>,
    pub nonce: Option<String>,
}

impl TestIdTokenClaims {
    pub fn valid() -> TestIdTokenClaims {
        TestIdTokenClaims {
            iss: Some(ISS.into()),
            sub: Some("user-1".into()),
            aud: Some(AUD.into()),
            exp: Some(Utc::now().timestamp() + 300),
            nbf: Some(Utc::now().timestamp() - 300),
            nonce: Some("abc123".into()),
        }
    }

    pub fn invalid_aud() -> TestIdTokenClaims {
        let mut claims = TestIdTokenClaims::valid();
        claims.aud = Some(WRONG_AUD.into());
        claims
    }
}
