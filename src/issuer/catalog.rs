use crate::error::IssuerConfigError;
use crate::issuer::{IssuerConfig, IssuerConfigInput};
use crate::monitor::{Monitor, SecurityEventCounter};
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable mapping from issuer identifier to [IssuerConfig], built once from a list
/// of [IssuerConfigInput]s and frozen. Per design notes: the resolver owns this catalog;
/// loaders are referenced by each [IssuerConfig], not held separately.
#[derive(Debug, Clone)]
pub struct IssuerCatalog {
    issuers: HashMap<String, Arc<IssuerConfig>>,
}

impl IssuerCatalog {
    /// Builds a frozen [IssuerCatalog] from `inputs`, constructing (but not starting) one
    /// [JwksLoader](crate::jwks::JwksLoader) per issuer.
    pub fn build(
        inputs: Vec<IssuerConfigInput>,
        http_client: reqwest::Client,
        counter: Arc<SecurityEventCounter>,
        monitor: Arc<Monitor>,
    ) -> Result<IssuerCatalog, IssuerConfigError> {
        let mut issuers = HashMap::with_capacity(inputs.len());

        for input in inputs {
            let identifier = input.issuer_identifier.clone();
            let issuer_config = IssuerConfig::new(
                input,
                http_client.clone(),
                counter.clone(),
                monitor.clone(),
            )?;

            if issuers.insert(identifier.clone(), Arc::new(issuer_config)).is_some() {
                return Err(IssuerConfigError::DuplicateIssuerIdentifier(identifier));
            }
        }

        Ok(IssuerCatalog { issuers })
    }

    /// Exact-match lookup by issuer identifier. Never triggers a load.
    pub fn get(&self, issuer_identifier: &str) -> Option<&Arc<IssuerConfig>> {
        self.issuers.get(issuer_identifier)
    }

    /// All configured issuer identifiers, for host readiness-probe enumeration.
    pub fn issuer_identifiers(&self) -> impl Iterator<Item = &str> {
        self.issuers.keys().map(String::as_str)
    }
}
