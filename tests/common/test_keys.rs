use base64::Engine;
use jsonwebtoken::jwk::*;
use jsonwebtoken::*;
use rsa::pkcs1::*;
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

/// Default [TestKeys] to use in tests.
pub static TEST_RSA_KEYS: LazyLock<TestKeys, fn() -> TestKeys> = LazyLock::new(|| TestKeys::rsa().unwrap());

/// Encoding keys plus the [JwkSet] to serve from [crate::common::TestServer].
#[derive(Clone)]
pub struct TestKeys {
    pub encoding_keys: Vec<EncodingKeySpec>,
    pub jwks: JwkSet,
}

impl TestKeys {
    pub fn rsa() -> anyhow::Result<TestKeys> {
        let private_key = rsa::RsaPrivateKey::new(&mut OsRng, 2048)?;
        let public_key = rsa::RsaPublicKey::from(&private_key);

        let algs = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

        let mut jwks = JwkSet { keys: vec![] };
        let mut encoding_keys = vec![];

        for alg in algs {
            let key_id = Uuid::now_v7().to_string();
            let key_alg = KeyAlgorithm::from_str(&format!("{alg:?}"))?;

            let jwk = Jwk {
                common: CommonParameters {
                    public_key_use: Some(PublicKeyUse::Signature),
                    key_id: Some(key_id.clone()),
                    key_algorithm: Some(key_alg),
                    key_operations: None,
                    x509_url: None,
                    x509_chain: None,
                    x509_sha1_fingerprint: None,
                    x509_sha256_fingerprint: None,
                },
                algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                    key_type: RSAKeyType::RSA,
                    n: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                    e: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
                }),
            };
            jwks.keys.push(jwk);

            let encoding_key = EncodingKey::from_rsa_pem(private_key.to_pkcs1_pem(LineEnding::default())?.as_bytes())?;
            encoding_keys.push(EncodingKeySpec {
                key_id,
                algorithm: alg,
                encoding_key,
            });
        }

        Ok(TestKeys { encoding_keys, jwks })
    }
}

/// An [EncodingKey] paired with the `key_id`/`algorithm` its matching JWK entry carries.
#[derive(Clone)]
pub struct EncodingKeySpec {
    pub key_id: String,
    pub algorithm: Algorithm,
    pub encoding_key: EncodingKey,
}
