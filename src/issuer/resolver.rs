use crate::error::{ValidationError, ValidationErrorKind};
use crate::issuer::{IssuerCatalog, IssuerConfig};
use crate::jwks::LoaderStatus;
use crate::monitor::SecurityEventCounter;
use std::sync::Arc;

/// Maps a token's `iss` claim to a trusted, healthy [IssuerConfig].
///
/// The single policy choke-point for "should we even try to verify this token against
/// this issuer right now" — resolution fails fast on an unhealthy loader rather than
/// letting a caller race an in-flight (or never-started) JWKS load.
pub struct IssuerResolver<'a> {
    catalog: &'a IssuerCatalog,
}

impl<'a> IssuerResolver<'a> {
    pub fn new(catalog: &'a IssuerCatalog) -> IssuerResolver<'a> {
        IssuerResolver { catalog }
    }

    /// Resolves `iss` to a healthy [IssuerConfig], or fails with [ValidationErrorKind::UnknownIssuer]
    /// / [ValidationErrorKind::IssuerNotHealthy].
    pub fn resolve(
        &self,
        iss: Option<&str>,
        counter: &SecurityEventCounter,
    ) -> Result<Arc<IssuerConfig>, ValidationError> {
        let iss = iss.ok_or_else(|| {
            counter.increment(ValidationErrorKind::UnknownIssuer.event_type());
            ValidationError::new(ValidationErrorKind::UnknownIssuer, "token carries no iss claim")
        })?;

        let issuer_config = self.catalog.get(iss).cloned().ok_or_else(|| {
            counter.increment(ValidationErrorKind::UnknownIssuer.event_type());
            ValidationError::new(
                ValidationErrorKind::UnknownIssuer,
                format!("no issuer configured for iss={iss}"),
            )
        })?;

        if issuer_config.jwks_loader.current_status() != LoaderStatus::Ok {
            counter.increment(ValidationErrorKind::IssuerNotHealthy.event_type());
            return Err(ValidationError::new(
                ValidationErrorKind::IssuerNotHealthy,
                format!("issuer {iss} is not currently healthy"),
            ));
        }

        Ok(issuer_config)
    }
}
