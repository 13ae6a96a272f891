use std::collections::HashMap;

/// The three base64url segments of a compact JWS.
#[derive(Debug, Clone)]
pub struct JwsSegments {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// The result of [crate::pipeline::JwtDecoder] splitting and decoding a compact token.
///
/// Ephemeral: never stored in the access token cache, which keys on the raw string
/// and caches the built [crate::token::TokenContent] instead.
#[derive(Debug, Clone)]
pub struct DecodedJwt {
    /// The original compact token string.
    pub raw: String,

    /// The three base64url segments, present for JWS-shaped tokens.
    pub segments: Option<JwsSegments>,

    /// The parsed JSON header object. Empty for opaque refresh tokens.
    pub header: HashMap<String, serde_json::Value>,

    /// The parsed JSON payload object. Absent for opaque refresh tokens.
    pub payload: Option<HashMap<String, serde_json::Value>>,

    /// The `iss` claim extracted from `payload`, if present, for fast resolver lookup.
    pub iss: Option<String>,
}

impl DecodedJwt {
    /// The exact bytes of `header.payload` (the first two segments joined by `.`),
    /// the input to signature verification. `None` for opaque tokens.
    pub fn signing_input(&self) -> Option<String> {
        let segments = self.segments.as_ref()?;
        Some(format!("{}.{}", segments.header, segments.payload))
    }

    /// The raw base64url-encoded signature segment, exactly as it appears in the compact
    /// token (not decoded: `jsonwebtoken::crypto::verify` takes the encoded form
    /// directly). `None` for opaque tokens.
    pub fn signature_segment(&self) -> Option<&str> {
        self.segments.as_ref().map(|s| s.signature.as_str())
    }

    /// The header's `alg` claim, if present and a string.
    pub fn header_alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(|v| v.as_str())
    }

    /// The header's `kid` claim, if present and a string.
    pub fn header_kid(&self) -> Option<&str> {
        self.header.get("kid").and_then(|v| v.as_str())
    }

    /// The header's `typ` claim, if present and a string.
    pub fn header_typ(&self) -> Option<&str> {
        self.header.get("typ").and_then(|v| v.as_str())
    }
}
