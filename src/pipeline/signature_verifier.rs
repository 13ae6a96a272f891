use crate::error::{ValidationError, ValidationErrorKind};
use crate::issuer::IssuerConfig;
use crate::jwks::JwkMaterial;
use crate::monitor::SecurityEventCounter;
use crate::token::DecodedJwt;
use jsonwebtoken::{Algorithm, DecodingKey, crypto};
use std::str::FromStr;

/// Verifies a [DecodedJwt]'s signature against the resolved issuer's current JWKS snapshot.
///
/// Cryptographic primitives are delegated entirely to `jsonwebtoken::crypto::verify` and
/// `DecodingKey`; this component's job is algorithm/key selection and class agreement,
/// not implementing cryptography itself.
pub struct SignatureVerifier;

impl SignatureVerifier {
    pub fn new() -> SignatureVerifier {
        SignatureVerifier
    }

    /// `alg` is the header algorithm already validated by [crate::pipeline::HeaderValidator]
    /// against the issuer's preferences.
    pub fn verify(
        &self,
        decoded: &DecodedJwt,
        alg: &str,
        issuer_config: &IssuerConfig,
        counter: &SecurityEventCounter,
    ) -> Result<(), ValidationError> {
        let key = issuer_config
            .jwks_loader
            .get_key_info(decoded.header_kid(), &issuer_config.signature_algorithms)
            .ok_or_else(|| {
                counter.increment(ValidationErrorKind::KeyNotFound.event_type());
                ValidationError::new(ValidationErrorKind::KeyNotFound, "no matching JWK for this token's kid")
            })?;

        if key.algorithm_class() != algorithm_class(alg) {
            counter.increment(ValidationErrorKind::AlgKeyMismatch.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::AlgKeyMismatch,
                format!("alg {alg} does not match the resolved key's algorithm class"),
            ));
        }

        let algorithm = Algorithm::from_str(alg).map_err(|e| {
            counter.increment(ValidationErrorKind::UnsupportedAlgorithm.event_type());
            ValidationError::with_source(ValidationErrorKind::UnsupportedAlgorithm, format!("unrecognized alg: {alg}"), e)
        })?;

        let decoding_key = decoding_key_for(&key.material).map_err(|e| {
            counter.increment(ValidationErrorKind::KeyNotFound.event_type());
            ValidationError::with_source(ValidationErrorKind::KeyNotFound, "failed to construct decoding key from JWK", e)
        })?;

        let signing_input = decoded.signing_input().ok_or_else(|| {
            counter.increment(ValidationErrorKind::SignatureInvalid.event_type());
            ValidationError::new(ValidationErrorKind::SignatureInvalid, "token has no signing input")
        })?;

        let signature_b64 = decoded.signature_segment().unwrap_or_default();

        let verified = crypto::verify(signature_b64, signing_input.as_bytes(), &decoding_key, algorithm).map_err(|e| {
            counter.increment(ValidationErrorKind::SignatureInvalid.event_type());
            ValidationError::with_source(ValidationErrorKind::SignatureInvalid, "signature verification failed", e)
        })?;

        if !verified {
            counter.increment(ValidationErrorKind::SignatureInvalid.event_type());
            return Err(ValidationError::new(ValidationErrorKind::SignatureInvalid, "signature does not match"));
        }

        Ok(())
    }
}

impl Default for SignatureVerifier {
    fn default() -> SignatureVerifier {
        SignatureVerifier::new()
    }
}

/// Maps a header `alg` to the algorithm class [crate::jwks::JwkKey::algorithm_class] reports,
/// so a key's declared class can be compared against the header without constructing a
/// full [Algorithm] first.
fn algorithm_class(alg: &str) -> &'static str {
    match alg {
        "RS256" | "RS384" | "RS512" | "PS256" | "PS384" | "PS512" => "RSA",
        "ES256" => "ES256",
        "ES384" => "ES384",
        "ES512" => "ES512",
        "EdDSA" => "EdDSA",
        _ => "unknown",
    }
}

fn decoding_key_for(material: &JwkMaterial) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
    match material {
        JwkMaterial::Rsa { n, e } => DecodingKey::from_rsa_components(n, e),
        JwkMaterial::Ec { x, y, .. } => DecodingKey::from_ec_components(x, y),
        JwkMaterial::Okp { x, .. } => DecodingKey::from_ed_components(x),
    }
}
