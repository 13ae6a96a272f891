use crate::jwks::{
    JwkKey, JwksFetchError, JwksLoaderConfig, JwksSnapshot, JwksUrl, LoaderStatus,
    OidcProviderMetadataResponse,
};
use crate::jwks::loader_status::AtomicLoaderStatus;
use crate::jwks::jwk_key::RawJwkSet;
use crate::monitor::{EventType, MeasurementType, Monitor, SecurityEventCounter, Ticker};
use arc_swap::ArcSwapOption;
use backon::Retryable;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// The outcome of a single (post-retry) fetch attempt.
enum FetchOutcome {
    NotModified,
    Loaded {
        keys: Vec<JwkKey>,
        etag: Option<String>,
    },
}

/// Per-issuer JWKS loader: fetches, caches, and periodically refreshes a
/// [JwksSnapshot] in the background, exposing a non-blocking [LoaderStatus].
///
/// The loader never performs network I/O from a status/key-lookup read path; all
/// fetching happens inside [JwksLoader::start]'s background task, driven by a
/// periodic timer, never by reader traffic.
pub struct JwksLoader {
    inner: Arc<Inner>,
}

struct Inner {
    issuer: String,
    http_client: reqwest::Client,
    config: JwksLoaderConfig,
    status: AtomicLoaderStatus,
    snapshot: ArcSwapOption<JwksSnapshot>,
    last_fetched_at_millis: AtomicI64,
    fetch_guard: AsyncMutex<()>,
    counter: Arc<SecurityEventCounter>,
    monitor: Arc<Monitor>,
    refresh_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl JwksLoader {
    /// Creates a new [JwksLoader] in [LoaderStatus::Uninitialized]. Call [JwksLoader::start]
    /// to begin background fetching.
    pub fn new(
        issuer: impl Into<String>,
        http_client: reqwest::Client,
        config: JwksLoaderConfig,
        counter: Arc<SecurityEventCounter>,
        monitor: Arc<Monitor>,
    ) -> JwksLoader {
        JwksLoader {
            inner: Arc::new(Inner {
                issuer: issuer.into(),
                http_client,
                config,
                status: AtomicLoaderStatus::new(LoaderStatus::Uninitialized),
                snapshot: ArcSwapOption::from(None),
                last_fetched_at_millis: AtomicI64::new(0),
                fetch_guard: AsyncMutex::new(()),
                counter,
                monitor,
                refresh_handle: std::sync::Mutex::new(None),
            }),
        }
    }

    /// Starts the background refresh task: an immediate initial fetch, then a fetch
    /// every `refresh_interval`. Idempotent-ish: calling twice replaces the previous
    /// background task (aborting it first).
    pub fn start(&self) {
        let inner = self.inner.clone();

        let handle = tokio::spawn(async move {
            inner.refresh_once().await;

            let mut interval = tokio::time::interval(inner.config.refresh_interval);
            interval.tick().await; // first tick fires immediately; already loaded above.

            loop {
                interval.tick().await;
                inner.refresh_once().await;
            }
        });

        let mut slot = self.inner.refresh_handle.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Non-blocking read of the current [LoaderStatus]. Never performs I/O.
    pub fn current_status(&self) -> LoaderStatus {
        self.inner.status.get()
    }

    /// `current_status() == LoaderStatus::Ok`.
    pub fn is_healthy(&self) -> bool {
        self.current_status() == LoaderStatus::Ok
    }

    /// Returns the current [JwksSnapshot], if any has been loaded. Never triggers a load.
    pub fn current_snapshot(&self) -> Option<Arc<JwksSnapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Looks up a key by `kid`. If `kid` is absent and exactly one usable key (per
    /// `signature_algorithms`) is available, returns that key. Never triggers a load.
    pub fn get_key_info(&self, kid: Option<&str>, signature_algorithms: &[String]) -> Option<JwkKey> {
        let snapshot = self.current_snapshot()?;

        match kid {
            Some(_) => snapshot.find(kid).filter(|k| k.is_usable(signature_algorithms)).cloned(),
            None => {
                let mut usable = snapshot.keys.iter().filter(|k| k.is_usable(signature_algorithms));
                let only = usable.next()?;
                if usable.next().is_some() {
                    None
                } else {
                    Some(only.clone())
                }
            }
        }
    }

    /// Milliseconds since epoch of the most recent fetch attempt (successful or not),
    /// updated on every `200` and `304` response, independent of snapshot identity.
    pub fn last_fetched_at_millis(&self) -> i64 {
        self.inner.last_fetched_at_millis.load(Ordering::Acquire)
    }

    /// The issuer identifier this loader serves.
    pub fn issuer(&self) -> &str {
        &self.inner.issuer
    }
}

impl Inner {
    async fn refresh_once(&self) {
        let Ok(_permit) = self.fetch_guard.try_lock() else {
            // A refresh is already in flight (background tick overlapped with a
            // long-running fetch); this tick coalesces into the in-flight one.
            return;
        };

        let was_ok = self.status.get() == LoaderStatus::Ok;
        if !was_ok {
            self.status.set(LoaderStatus::Loading);
        }

        let ticker = Ticker::start(&self.monitor, MeasurementType::JwksOp);
        let etag = self.snapshot.load().as_ref().and_then(|s| s.etag.clone());

        let result = (|| self.fetch_once(etag.clone()))
            .retry(self.config.backoff)
            .notify(|_err, _delay| {
                #[cfg(feature = "tracing")]
                tracing::warn!(issuer = %self.issuer, "retrying JWKS fetch in {}ms", _delay.as_millis());
            })
            .await;
        ticker.stop_and_record();

        match result {
            Ok(FetchOutcome::NotModified) => {
                self.last_fetched_at_millis
                    .store(Utc::now().timestamp_millis(), Ordering::Release);
                self.status.set(LoaderStatus::Ok);
            }
            Ok(FetchOutcome::Loaded { keys, etag }) => {
                if keys.len() > self.config.max_jwks_keys {
                    self.counter.increment(EventType::JwksKeySizeLimitExceeded);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        issuer = %self.issuer,
                        count = keys.len(),
                        limit = self.config.max_jwks_keys,
                        "JWKS key count exceeds configured limit; keeping all keys"
                    );
                }

                let snapshot = JwksSnapshot {
                    keys: Arc::new(keys),
                    issuer: self.issuer.clone(),
                    etag,
                    loaded_at: Utc::now(),
                };
                self.snapshot.store(Some(Arc::new(snapshot)));
                self.last_fetched_at_millis
                    .store(Utc::now().timestamp_millis(), Ordering::Release);
                self.status.set(LoaderStatus::Ok);
            }
            Err(e) => {
                let event = if e.is_well_known_resolution_failure() {
                    EventType::JwksUriResolutionFailed
                } else if e.is_json_parse_failure() {
                    EventType::JwksJsonParseFailed
                } else {
                    EventType::JwksLoadFailed
                };
                self.counter.increment(event);

                #[cfg(feature = "tracing")]
                tracing::error!(issuer = %self.issuer, error = %e, "JWKS refresh failed");

                if !was_ok {
                    self.status.set(LoaderStatus::Error);
                }
                // else: degrade gracefully, keep serving the last good snapshot.
            }
        }
    }

    async fn fetch_once(&self, prior_etag: Option<String>) -> Result<FetchOutcome, JwksFetchError> {
        let jwks_url = self.resolve_jwks_url().await?;

        let mut request = self
            .http_client
            .get(jwks_url)
            .timeout(self.config.fetch_timeout);
        if let Some(etag) = &prior_etag {
            request = request.header(reqwest::header::IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(JwksFetchError::JwksRequestFailed)?;

        if response.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }

        let response = response
            .error_for_status()
            .map_err(JwksFetchError::JwksRequestFailed)?;

        let new_etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(JwksFetchError::JwksRequestFailed)?;

        if bytes.len() > self.config.max_jwks_bytes {
            return Err(JwksFetchError::JwksResponseTooLarge {
                max_bytes: self.config.max_jwks_bytes,
                actual_bytes: bytes.len(),
            });
        }

        let raw: RawJwkSet = serde_json::from_slice(&bytes)?;
        let keys = raw.keys.into_iter().filter_map(|k| k.into_jwk_key()).collect();

        Ok(FetchOutcome::Loaded {
            keys,
            etag: new_etag,
        })
    }

    async fn resolve_jwks_url(&self) -> Result<url::Url, JwksFetchError> {
        match &self.config.jwks_url {
            JwksUrl::Direct(uri) => Ok(uri.clone()),
            JwksUrl::Discover(uri) => {
                let response = self
                    .http_client
                    .get(uri.clone())
                    .timeout(self.config.fetch_timeout)
                    .send()
                    .await
                    .map_err(JwksFetchError::WellKnownRequestFailed)?;

                let metadata = response
                    .json::<OidcProviderMetadataResponse>()
                    .await
                    .map_err(JwksFetchError::InvalidWellKnownResponse)?;

                Ok(metadata.jwks_uri)
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_handle.lock().unwrap_or_else(|p| p.into_inner()).take() {
            handle.abort();
        }
    }
}
