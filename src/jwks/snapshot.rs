use crate::jwks::JwkKey;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// An immutable, atomically-swappable view of an issuer's JWKS, as held by
/// [crate::jwks::JwksLoader].
///
/// `keys` is reference-counted separately from the snapshot itself so that a
/// `304 Not Modified` response (which must not change snapshot identity, per
/// the loader's ETag-refresh invariant) can still produce a fresh
/// `last_fetched_at` reading without cloning the key set.
#[derive(Debug, Clone)]
pub struct JwksSnapshot {
    pub keys: Arc<Vec<JwkKey>>,
    pub issuer: String,
    pub etag: Option<String>,
    /// When this snapshot's key set was produced (fixed across `304` responses).
    pub loaded_at: DateTime<Utc>,
}

impl JwksSnapshot {
    /// Looks up a key by `kid`. If `kid` is `None` and exactly one key is present,
    /// returns that sole key. Never triggers a load.
    pub fn find(&self, kid: Option<&str>) -> Option<&JwkKey> {
        match kid {
            Some(kid) => self.keys.iter().find(|k| k.kid.as_deref() == Some(kid)),
            None if self.keys.len() == 1 => self.keys.first(),
            None => None,
        }
    }
}
