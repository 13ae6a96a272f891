use crate::cache::AccessTokenCacheConfig;
use crate::error::InternalCacheError;
use crate::monitor::{EventType, MeasurementType, Monitor, SecurityEventCounter, Ticker};
use crate::token::AccessTokenContent;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

struct AccessCacheEntry {
    content: AccessTokenContent,
    exp: DateTime<Utc>,
}

/// Fingerprint-keyed, size-bounded cache of successfully validated access tokens, used as
/// an early-out before expensive cryptography.
///
/// `max_size == 0` disables caching: [AccessTokenCache::get]/[AccessTokenCache::put] become
/// no-ops. Internal corruption (a poisoned lock) never causes a token to be falsely
/// accepted or rejected: it degrades to a cache miss via [InternalCacheError].
pub struct AccessTokenCache {
    inner: Arc<Inner>,
}

struct Inner {
    entries: RwLock<HashMap<String, AccessCacheEntry>>,
    lru_order: Mutex<VecDeque<String>>,
    config: AccessTokenCacheConfig,
    monitor: Arc<Monitor>,
    sweep_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AccessTokenCache {
    pub fn new(config: AccessTokenCacheConfig, monitor: Arc<Monitor>) -> AccessTokenCache {
        AccessTokenCache {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                lru_order: Mutex::new(VecDeque::new()),
                config,
                monitor,
                sweep_handle: std::sync::Mutex::new(None),
            }),
        }
    }

    /// Whether this cache is enabled (`max_size > 0`).
    pub fn is_enabled(&self) -> bool {
        self.inner.config.max_size > 0
    }

    /// Starts the periodic eviction sweep. No-op if the cache is disabled.
    pub fn start(&self, clock_skew: Duration) {
        if !self.is_enabled() {
            return;
        }

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(inner.config.eviction_interval);
            loop {
                interval.tick().await;
                inner.sweep(clock_skew);
            }
        });

        let mut slot = self
            .inner
            .sweep_handle
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Looks up `raw`'s fingerprint (the raw token string itself). Records a `cache-lookup`
    /// ticker and increments `CACHE_HIT`/`CACHE_MISS`. A hit whose `exp` has passed (against
    /// a freshly captured `now`) is removed and treated as a miss.
    pub fn get(&self, raw: &str, now: DateTime<Utc>, counter: &SecurityEventCounter) -> Option<AccessTokenContent> {
        if !self.is_enabled() {
            return None;
        }

        let ticker = Ticker::start(&self.inner.monitor, MeasurementType::CacheLookup);
        let result = self.inner.get(raw, now);
        ticker.stop_and_record();

        match result {
            Ok(Some(content)) => {
                counter.increment(EventType::CacheHit);
                self.touch(raw);
                Some(content)
            }
            Ok(None) => {
                counter.increment(EventType::CacheMiss);
                None
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("access token cache internal error, treating as miss: {e}");
                let _ = e;
                counter.increment(EventType::CacheMiss);
                None
            }
        }
    }

    /// Inserts `content` for `raw`, only called after full successful validation.
    /// Idempotent: re-inserting the same `raw` overwrites the prior entry.
    pub fn put(&self, raw: &str, content: AccessTokenContent) {
        if !self.is_enabled() {
            return;
        }

        let ticker = Ticker::start(&self.inner.monitor, MeasurementType::CacheStore);
        self.inner.put(raw, content, self.inner.config.max_size);
        ticker.stop_and_record();
    }

    fn touch(&self, raw: &str) {
        let mut order = self
            .inner
            .lru_order
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        if let Some(pos) = order.iter().position(|k| k == raw) {
            let key = order.remove(pos).unwrap();
            order.push_back(key);
        }
    }
}

impl Inner {
    fn get(&self, raw: &str, now: DateTime<Utc>) -> Result<Option<AccessTokenContent>, InternalCacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| InternalCacheError("access token cache lock poisoned".to_string()))?;

        match entries.get(raw) {
            Some(entry) if entry.exp > now => Ok(Some(entry.content.clone())),
            Some(_) => {
                drop(entries);
                self.remove(raw);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, raw: &str, content: AccessTokenContent, max_size: usize) {
        let exp = content.expires_at;

        {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            entries.insert(raw.to_string(), AccessCacheEntry { content, exp });
        }

        let mut order = self.lru_order.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pos) = order.iter().position(|k| k == raw) {
            order.remove(pos);
        }
        order.push_back(raw.to_string());

        while order.len() > max_size {
            if let Some(oldest) = order.pop_front() {
                let mut entries = self
                    .entries
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                entries.remove(&oldest);
            }
        }
    }

    fn remove(&self, raw: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(raw);

        let mut order = self.lru_order.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pos) = order.iter().position(|k| k == raw) {
            order.remove(pos);
        }
    }

    fn sweep(&self, clock_skew: Duration) {
        let now = Utc::now();
        let skew = chrono::Duration::from_std(clock_skew).unwrap_or_default();
        let cutoff = now - skew;

        let expired: Vec<String> = {
            let entries = self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            entries
                .iter()
                .filter(|(_, entry)| entry.exp < cutoff)
                .map(|(key, _)| key.clone())
                .collect()
        };

        for key in expired {
            self.remove(&key);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .sweep_handle
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorConfig;
    use std::collections::HashMap as StdHashMap;

    fn content(sub: &str, exp: DateTime<Utc>) -> AccessTokenContent {
        AccessTokenContent {
            subject: sub.to_string(),
            scopes: vec![],
            roles: vec![],
            authorized_party: None,
            audience: vec![],
            expires_at: exp,
            claims: StdHashMap::new(),
            raw: "raw".to_string(),
        }
    }

    #[test]
    fn disabled_cache_is_always_a_miss() {
        let config = AccessTokenCacheConfig { max_size: 0, ..AccessTokenCacheConfig::default() };
        let cache = AccessTokenCache::new(config, Arc::new(Monitor::new(MonitorConfig::default())));
        let counter = SecurityEventCounter::new();

        cache.put("raw", content("u1", Utc::now() + chrono::Duration::seconds(60)));
        assert!(cache.get("raw", Utc::now(), &counter).is_none());
    }

    #[test]
    fn hit_then_miss_after_expiry() {
        let cache = AccessTokenCache::new(AccessTokenCacheConfig::default(), Arc::new(Monitor::new(MonitorConfig::default())));
        let counter = SecurityEventCounter::new();
        let now = Utc::now();

        cache.put("tok", content("u1", now + chrono::Duration::seconds(60)));
        assert!(cache.get("tok", now, &counter).is_some());

        let later = now + chrono::Duration::seconds(120);
        assert!(cache.get("tok", later, &counter).is_none());
    }

    #[test]
    fn lru_evicts_oldest_when_over_size() {
        let config = AccessTokenCacheConfig { max_size: 2, ..AccessTokenCacheConfig::default() };
        let cache = AccessTokenCache::new(config, Arc::new(Monitor::new(MonitorConfig::default())));
        let counter = SecurityEventCounter::new();
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(60);

        cache.put("a", content("a", exp));
        cache.put("b", content("b", exp));
        cache.put("c", content("c", exp));

        assert!(cache.get("a", now, &counter).is_none());
        assert!(cache.get("b", now, &counter).is_some());
        assert!(cache.get("c", now, &counter).is_some());
    }
}
