mod common;

use crate::common::*;
use jsonwebtoken::Header;
use jwt_validator::monitor::EventType;
use jwt_validator::jwks::LoaderStatus;
use jwt_validator::Validator;
use reqwest::Client;
use std::time::Duration;

async fn wait_until_healthy(validator: &Validator) {
    let mut interval = tokio::time::interval(Duration::from_millis(10));
    for _ in 0..200 {
        if validator.issuer_status(ISS) == Some(LoaderStatus::Ok) {
            return;
        }
        interval.tick().await;
    }
    panic!("issuer never became healthy");
}

#[tokio::test]
async fn second_validation_of_the_same_token_is_a_cache_hit_with_equal_content() -> anyhow::Result<()> {
    init_logging();

    let server = TestServer::new();
    let test_keys = TEST_RSA_KEYS.clone();
    let uris = server.start(test_keys.jwks.clone()).await?;

    let config = default_config(uris.direct_jwks_url);
    let validator = Validator::new_from_config(config, Client::new())?;
    validator.start();
    wait_until_healthy(&validator).await;

    let key = &test_keys.encoding_keys[0];
    let mut header = Header::new(key.algorithm);
    header.kid = Some(key.key_id.clone());
    let token = jsonwebtoken::encode(&header, &TestAccessTokenClaims::valid(), &key.encoding_key)?;

    let first = validator.create_access_token(&token)?;
    assert_eq!(validator.counter().get(EventType::CacheMiss), 1);
    assert_eq!(validator.counter().get(EventType::CacheHit), 0);

    let second = validator.create_access_token(&token)?;
    assert_eq!(second, first);
    assert_eq!(validator.counter().get(EventType::CacheHit), 1);
    assert_eq!(validator.counter().get(EventType::CacheMiss), 1);

    Ok(())
}

#[tokio::test]
async fn disabled_cache_never_records_a_hit() -> anyhow::Result<()> {
    init_logging();

    let server = TestServer::new();
    let test_keys = TEST_RSA_KEYS.clone();
    let uris = server.start(test_keys.jwks.clone()).await?;

    let mut config = default_config(uris.direct_jwks_url);
    config.cache.max_size = 0;

    let validator = Validator::new_from_config(config, Client::new())?;
    validator.start();
    wait_until_healthy(&validator).await;

    let key = &test_keys.encoding_keys[0];
    let mut header = Header::new(key.algorithm);
    header.kid = Some(key.key_id.clone());
    let token = jsonwebtoken::encode(&header, &TestAccessTokenClaims::valid(), &key.encoding_key)?;

    validator.create_access_token(&token)?;
    validator.create_access_token(&token)?;

    assert_eq!(validator.counter().get(EventType::CacheHit), 0);
    assert_eq!(validator.counter().get(EventType::CacheMiss), 0);

    Ok(())
}

#[tokio::test]
async fn etag_304_keeps_loader_healthy_without_a_fresh_body() -> anyhow::Result<()> {
    init_logging();

    let server = TestServer::new();
    let test_keys = TEST_RSA_KEYS.clone();
    let uris = server.start(test_keys.jwks.clone()).await?;

    server.set_jwks_response(TestServerResponse::success_with_etag(
        axum::Json(serde_json::to_value(&test_keys.jwks)?),
        "\"v1\"",
    ));

    let config = default_config(uris.direct_jwks_url);
    let validator = Validator::new_from_config(config, Client::new())?;
    validator.start();
    wait_until_healthy(&validator).await;

    // A couple of refresh ticks (refresh_interval is 50ms in default_config) elapse
    // while the server keeps serving the same ETag; the loader answers with 304 and
    // must remain healthy and keep serving the same keys throughout.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(validator.issuer_status(ISS), Some(LoaderStatus::Ok));

    let key = &test_keys.encoding_keys[0];
    let mut header = Header::new(key.algorithm);
    header.kid = Some(key.key_id.clone());
    let token = jsonwebtoken::encode(&header, &TestAccessTokenClaims::valid(), &key.encoding_key)?;

    let content = validator.create_access_token(&token)?;
    assert_eq!(content.subject, "user-1");

    Ok(())
}
