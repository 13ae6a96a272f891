use serde::Deserialize;

/// Algorithm-specific key material for a [JwkKey], narrowed to the `kty` values this
/// crate accepts (`RSA`, `EC`, `OKP`). `kty=oct` keys never reach this type: they are
/// filtered out while parsing the containing JWKS document (see [RawJwk::into_jwk_key]).
#[derive(Debug, Clone, PartialEq)]
pub enum JwkMaterial {
    Rsa { n: String, e: String },
    Ec { crv: String, x: String, y: String },
    Okp { crv: String, x: String },
}

impl JwkMaterial {
    /// The algorithm family this key material supports (`"RSA"`, `"EC"`, or `"OKP"`).
    pub fn kty(&self) -> &'static str {
        match self {
            JwkMaterial::Rsa { .. } => "RSA",
            JwkMaterial::Ec { .. } => "EC",
            JwkMaterial::Okp { .. } => "OKP",
        }
    }
}

/// A single signing key from a JWKS document.
#[derive(Debug, Clone, PartialEq)]
pub struct JwkKey {
    pub kid: Option<String>,
    /// The JWK `use` parameter. A key is only usable for signature verification when
    /// this is absent or equal to `"sig"`.
    pub key_use: Option<String>,
    /// The JWK `alg` parameter, if present. Many real-world JWKS (e.g. Azure AD) omit it.
    pub alg: Option<String>,
    pub material: JwkMaterial,
}

impl JwkKey {
    /// Whether this key is eligible for signature verification: `use` is absent or
    /// `"sig"`, and if `alg` is present, it is among `signature_algorithms`.
    pub fn is_usable(&self, signature_algorithms: &[String]) -> bool {
        let use_ok = matches!(self.key_use.as_deref(), None | Some("sig"));
        let alg_ok = match &self.alg {
            None => true,
            Some(alg) => signature_algorithms.iter().any(|a| a == alg),
        };
        use_ok && alg_ok
    }

    /// The algorithm class this key's material implies (`"RS"`, `"PS"`, `"ES"`, or `"EdDSA"`),
    /// used by [crate::pipeline::SignatureVerifier] to check `alg`/key-class agreement.
    pub fn algorithm_class(&self) -> &'static str {
        match &self.material {
            JwkMaterial::Rsa { .. } => "RSA",
            JwkMaterial::Ec { crv, .. } => match crv.as_str() {
                "P-256" => "ES256",
                "P-384" => "ES384",
                "P-521" => "ES512",
                _ => "EC-unknown",
            },
            JwkMaterial::Okp { .. } => "EdDSA",
        }
    }
}

/// Wire format of a single JWK entry, as it appears in a JWKS document. Deserialized
/// permissively (unknown `kty` values and `kty=oct` are filtered out by
/// [RawJwkSet]'s `TryFrom`, not rejected at the `serde` layer, so one bad key does not
/// fail the whole document).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawJwk {
    pub kty: String,
    pub kid: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    pub crv: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Wire format of a JWKS document (RFC 7517): `{"keys": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawJwkSet {
    pub keys: Vec<RawJwk>,
}

impl RawJwk {
    /// Converts this raw entry into a [JwkKey], or `None` if its `kty` is `oct` or
    /// unsupported, or it lacks the material its `kty` requires.
    pub(crate) fn into_jwk_key(self) -> Option<JwkKey> {
        let material = match self.kty.as_str() {
            "RSA" => JwkMaterial::Rsa {
                n: self.n?,
                e: self.e?,
            },
            "EC" => JwkMaterial::Ec {
                crv: self.crv?,
                x: self.x?,
                y: self.y?,
            },
            "OKP" => JwkMaterial::Okp {
                crv: self.crv?,
                x: self.x?,
            },
            // `oct` (symmetric) and any unrecognized `kty` are silently dropped.
            _ => return None,
        };

        Some(JwkKey {
            kid: self.kid,
            key_use: self.key_use,
            alg: self.alg,
            material,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_jwk(key_use: Option<&str>, alg: Option<&str>) -> JwkKey {
        JwkKey {
            kid: Some("k1".into()),
            key_use: key_use.map(String::from),
            alg: alg.map(String::from),
            material: JwkMaterial::Rsa {
                n: "n".into(),
                e: "AQAB".into(),
            },
        }
    }

    #[test]
    fn usable_when_use_absent_or_sig() {
        let prefs = vec!["RS256".to_string()];
        assert!(rsa_jwk(None, Some("RS256")).is_usable(&prefs));
        assert!(rsa_jwk(Some("sig"), Some("RS256")).is_usable(&prefs));
        assert!(!rsa_jwk(Some("enc"), Some("RS256")).is_usable(&prefs));
    }

    #[test]
    fn usable_when_alg_absent_or_in_preferences() {
        let prefs = vec!["RS256".to_string()];
        assert!(rsa_jwk(None, None).is_usable(&prefs));
        assert!(!rsa_jwk(None, Some("RS384")).is_usable(&prefs));
    }

    #[test]
    fn oct_keys_are_filtered_while_parsing() {
        let raw = RawJwk {
            kty: "oct".into(),
            kid: Some("k1".into()),
            key_use: None,
            alg: None,
            n: None,
            e: None,
            crv: None,
            x: None,
            y: None,
        };
        assert!(raw.into_jwk_key().is_none());
    }

    #[test]
    fn rsa_missing_material_is_filtered() {
        let raw = RawJwk {
            kty: "RSA".into(),
            kid: Some("k1".into()),
            key_use: None,
            alg: None,
            n: None,
            e: Some("AQAB".into()),
            crv: None,
            x: None,
            y: None,
        };
        assert!(raw.into_jwk_key().is_none());
    }
}
