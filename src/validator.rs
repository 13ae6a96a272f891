use crate::cache::AccessTokenCache;
use crate::config::ValidatorConfig;
use crate::error::{IssuerConfigError, ValidationError, ValidationErrorKind};
use crate::issuer::{IssuerCatalog, IssuerResolver};
use crate::jwks::LoaderStatus;
use crate::monitor::{EventType, MeasurementType, Monitor, SecurityEventCounter, Ticker};
use crate::pipeline::{ClaimValidator, HeaderValidator, JwtDecoder, PrePipelineValidator, SignatureVerifier, TokenBuilder, ValidationContext};
use crate::token::{AccessTokenContent, IdTokenContent, RefreshTokenContent, TokenKind};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// The multi-issuer JWT validation facade. Owns a frozen [IssuerCatalog], a
/// [SecurityEventCounter], a [Monitor], and an [AccessTokenCache]. Cheap to clone: all
/// state lives behind `Arc`.
///
/// Construction (catalog/counter/monitor/cache freeze) and background fetch startup are
/// two distinct steps, matching the catalog-freeze-then-async-start ordering of a
/// production bootstrap: [Validator::new_from_config] does the former,
/// [Validator::start] the latter.
#[derive(Clone)]
pub struct Validator {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: IssuerCatalog,
    counter: Arc<SecurityEventCounter>,
    monitor: Arc<Monitor>,
    cache: AccessTokenCache,
    pre_pipeline: PrePipelineValidator,
    decoder: JwtDecoder,
    header_validator: HeaderValidator,
    signature_verifier: SignatureVerifier,
    claim_validator: ClaimValidator,
    token_builder: TokenBuilder,
    clock_skew: Duration,
}

impl Validator {
    /// Builds a frozen [Validator] from `config`. Loaders are constructed `Uninitialized`;
    /// call [Validator::start] to begin background JWKS fetching.
    pub fn new_from_config(config: ValidatorConfig, http_client: reqwest::Client) -> Result<Validator, IssuerConfigError> {
        let counter = Arc::new(SecurityEventCounter::new());
        let monitor = Arc::new(Monitor::new(config.monitor));
        let cache = AccessTokenCache::new(config.cache, monitor.clone());

        let catalog = IssuerCatalog::build(config.issuers, http_client, counter.clone(), monitor.clone())?;

        Ok(Validator {
            inner: Arc::new(Inner {
                catalog,
                counter,
                monitor,
                cache,
                pre_pipeline: PrePipelineValidator::new(config.max_token_size),
                decoder: JwtDecoder::new(config.parser_limits),
                header_validator: HeaderValidator::new(),
                signature_verifier: SignatureVerifier::new(),
                claim_validator: ClaimValidator::new(),
                token_builder: TokenBuilder::new(),
                clock_skew: config.clock_skew,
            }),
        })
    }

    /// Starts one background JWKS-refresh task per configured issuer, and the access
    /// token cache's periodic eviction sweep. Requests arriving before the first
    /// successful fetch for an issuer see [ValidationErrorKind::IssuerNotHealthy].
    pub fn start(&self) {
        for issuer in self.inner.catalog.issuer_identifiers() {
            if let Some(issuer_config) = self.inner.catalog.get(issuer) {
                issuer_config.jwks_loader.start();
            }
        }
        self.inner.cache.start(self.inner.clock_skew);
    }

    /// Readiness passthrough: reads the named issuer's [LoaderStatus] without ever
    /// triggering a fetch. Returns `None` for an unconfigured issuer.
    pub fn issuer_status(&self, issuer: &str) -> Option<LoaderStatus> {
        self.inner.catalog.get(issuer).map(|c| c.jwks_loader.current_status())
    }

    /// All configured issuer identifiers.
    pub fn issuer_identifiers(&self) -> impl Iterator<Item = &str> {
        self.inner.catalog.issuer_identifiers()
    }

    /// A read-only handle to this validator's [SecurityEventCounter], for scraping.
    pub fn counter(&self) -> &SecurityEventCounter {
        &self.inner.counter
    }

    /// A read-only handle to this validator's [Monitor], for scraping.
    pub fn monitor(&self) -> &Monitor {
        &self.inner.monitor
    }

    /// Validates `raw` as an access token: pre-pipeline checks, a cache lookup, and
    /// (on miss) the full decode/resolve/verify/build/validate pipeline, populating the
    /// cache on success.
    pub fn create_access_token(&self, raw: &str) -> Result<AccessTokenContent, ValidationError> {
        let ticker = Ticker::start(&self.inner.monitor, MeasurementType::CompleteValidation);
        let result = self.create_access_token_inner(raw);
        ticker.stop_and_record();
        result
    }

    fn create_access_token_inner(&self, raw: &str) -> Result<AccessTokenContent, ValidationError> {
        self.inner.pre_pipeline.validate(raw, &self.inner.counter)?;

        let now = Utc::now();
        if let Some(content) = self.inner.cache.get(raw, now, &self.inner.counter) {
            return Ok(content);
        }

        let parse_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenParse);
        let decoded = self.inner.decoder.decode(raw, &self.inner.counter);
        parse_ticker.stop_and_record();
        let decoded = decoded?;

        let extract_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerExtract);
        let iss = decoded.iss.as_deref();
        extract_ticker.stop_and_record();

        let resolve_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerConfigResolve);
        let issuer_config = IssuerResolver::new(&self.inner.catalog).resolve(iss, &self.inner.counter);
        resolve_ticker.stop_and_record();
        let issuer_config = issuer_config?;

        let header_ticker = Ticker::start(&self.inner.monitor, MeasurementType::HeaderValidate);
        let alg = self.inner.header_validator.validate(&decoded, &issuer_config, &self.inner.counter);
        header_ticker.stop_and_record();
        let alg = alg?;

        let signature_ticker = Ticker::start(&self.inner.monitor, MeasurementType::SignatureVerify);
        let signature_result = self.inner.signature_verifier.verify(&decoded, &alg, &issuer_config, &self.inner.counter);
        signature_ticker.stop_and_record();
        signature_result?;

        let build_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenBuild);
        let content = self.inner.token_builder.build_access_token(&decoded, &issuer_config, &self.inner.counter);
        build_ticker.stop_and_record();
        let content = content?;

        let payload = decoded.payload.as_ref().ok_or_else(|| {
            self.inner.counter.increment(ValidationErrorKind::TokenBuildFailed.event_type());
            ValidationError::new(ValidationErrorKind::TokenBuildFailed, "token payload is missing or malformed")
        })?;
        let ctx = ValidationContext::new(now, self.inner.clock_skew);
        let claims_ticker = Ticker::start(&self.inner.monitor, MeasurementType::ClaimsValidate);
        let claims_result = self.inner.claim_validator.validate(TokenKind::Access, payload, &issuer_config, &ctx, &self.inner.counter);
        claims_ticker.stop_and_record();
        claims_result?;

        self.inner.counter.increment(EventType::AccessTokenCreated);
        self.inner.cache.put(raw, content.clone());
        Ok(content)
    }

    /// Validates `raw` as an ID token. Never consults or populates the access token cache.
    pub fn create_id_token(&self, raw: &str) -> Result<IdTokenContent, ValidationError> {
        let ticker = Ticker::start(&self.inner.monitor, MeasurementType::CompleteValidation);
        let result = self.create_id_token_inner(raw);
        ticker.stop_and_record();
        result
    }

    fn create_id_token_inner(&self, raw: &str) -> Result<IdTokenContent, ValidationError> {
        self.inner.pre_pipeline.validate(raw, &self.inner.counter)?;

        let parse_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenParse);
        let decoded = self.inner.decoder.decode(raw, &self.inner.counter);
        parse_ticker.stop_and_record();
        let decoded = decoded?;

        let extract_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerExtract);
        let iss = decoded.iss.as_deref();
        extract_ticker.stop_and_record();

        let resolve_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerConfigResolve);
        let issuer_config = IssuerResolver::new(&self.inner.catalog).resolve(iss, &self.inner.counter);
        resolve_ticker.stop_and_record();
        let issuer_config = issuer_config?;

        let header_ticker = Ticker::start(&self.inner.monitor, MeasurementType::HeaderValidate);
        let alg = self.inner.header_validator.validate(&decoded, &issuer_config, &self.inner.counter);
        header_ticker.stop_and_record();
        let alg = alg?;

        let signature_ticker = Ticker::start(&self.inner.monitor, MeasurementType::SignatureVerify);
        let signature_result = self.inner.signature_verifier.verify(&decoded, &alg, &issuer_config, &self.inner.counter);
        signature_ticker.stop_and_record();
        signature_result?;

        let build_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenBuild);
        let content = self.inner.token_builder.build_id_token(&decoded, &issuer_config, &self.inner.counter);
        build_ticker.stop_and_record();
        let content = content?;

        let payload = decoded.payload.as_ref().ok_or_else(|| {
            self.inner.counter.increment(ValidationErrorKind::TokenBuildFailed.event_type());
            ValidationError::new(ValidationErrorKind::TokenBuildFailed, "token payload is missing or malformed")
        })?;
        let ctx = ValidationContext::new(Utc::now(), self.inner.clock_skew);
        let claims_ticker = Ticker::start(&self.inner.monitor, MeasurementType::ClaimsValidate);
        let claims_result = self.inner.claim_validator.validate(TokenKind::Id, payload, &issuer_config, &ctx, &self.inner.counter);
        claims_ticker.stop_and_record();
        claims_result?;

        self.inner.counter.increment(EventType::IdTokenCreated);
        Ok(content)
    }

    /// Validates `raw` as a refresh token. Accepts both JWS-shaped and opaque refresh
    /// tokens: an opaque token only undergoes pre-pipeline and (if configured) issuer
    /// policy specific to opaque values, since it carries no decodable claims.
    pub fn create_refresh_token(&self, raw: &str) -> Result<RefreshTokenContent, ValidationError> {
        let ticker = Ticker::start(&self.inner.monitor, MeasurementType::CompleteValidation);
        let result = self.create_refresh_token_inner(raw);
        ticker.stop_and_record();
        result
    }

    fn create_refresh_token_inner(&self, raw: &str) -> Result<RefreshTokenContent, ValidationError> {
        self.inner.pre_pipeline.validate(raw, &self.inner.counter)?;

        let decoded = if raw.split('.').count() == 3 {
            let parse_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenParse);
            let decoded = self.inner.decoder.decode(raw, &self.inner.counter);
            parse_ticker.stop_and_record();
            decoded?
        } else {
            self.inner.decoder.decode_opaque(raw)
        };

        if let Some(payload) = &decoded.payload {
            let extract_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerExtract);
            let iss = decoded.iss.as_deref();
            extract_ticker.stop_and_record();

            let resolve_ticker = Ticker::start(&self.inner.monitor, MeasurementType::IssuerConfigResolve);
            let issuer_config = IssuerResolver::new(&self.inner.catalog).resolve(iss, &self.inner.counter);
            resolve_ticker.stop_and_record();
            let issuer_config = issuer_config?;

            let header_ticker = Ticker::start(&self.inner.monitor, MeasurementType::HeaderValidate);
            let alg = self.inner.header_validator.validate(&decoded, &issuer_config, &self.inner.counter);
            header_ticker.stop_and_record();
            let alg = alg?;

            let signature_ticker = Ticker::start(&self.inner.monitor, MeasurementType::SignatureVerify);
            let signature_result = self.inner.signature_verifier.verify(&decoded, &alg, &issuer_config, &self.inner.counter);
            signature_ticker.stop_and_record();
            signature_result?;

            let ctx = ValidationContext::new(Utc::now(), self.inner.clock_skew);
            let claims_ticker = Ticker::start(&self.inner.monitor, MeasurementType::ClaimsValidate);
            let claims_result = self.inner.claim_validator.validate(TokenKind::Refresh, payload, &issuer_config, &ctx, &self.inner.counter);
            claims_ticker.stop_and_record();
            claims_result?;

            let build_ticker = Ticker::start(&self.inner.monitor, MeasurementType::TokenBuild);
            let content = self.inner.token_builder.build_refresh_token(&decoded, &issuer_config);
            build_ticker.stop_and_record();

            self.inner.counter.increment(EventType::RefreshTokenCreated);
            return Ok(content);
        }

        self.inner.counter.increment(EventType::RefreshTokenCreated);
        Ok(RefreshTokenContent {
            claims: std::collections::HashMap::new(),
            raw: decoded.raw,
        })
    }
}
