//! Immutable provider catalog.
//!
//! Built once at start-up from the configured providers and the vendor
//! clients handed to the gateway. Every other component reads it; nothing
//! mutates it afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use super::descriptor::{ProviderDescriptor, ProviderTier};
use super::traits::VendorClient;
use crate::config::ProviderConfig;
use crate::errors::MarketDataError;

/// Read-only union view over every configured provider, in configuration order.
#[derive(Clone, Debug, Default)]
pub struct ProviderCatalog {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderCatalog {
    /// Build a catalog from descriptors, rejecting duplicate names.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self, MarketDataError> {
        for (i, provider) in providers.iter().enumerate() {
            if providers[..i].iter().any(|p| p.name == provider.name) {
                return Err(MarketDataError::InvalidConfig(format!(
                    "duplicate provider '{}'",
                    provider.name
                )));
            }
        }
        Ok(Self { providers })
    }

    /// Attach vendor clients to configured providers by name.
    ///
    /// Configured providers without a client stay cataloged but uninitialized.
    /// Clients naming an unconfigured provider are dropped with a warning.
    pub fn from_config(
        configs: &[ProviderConfig],
        clients: Vec<Arc<dyn VendorClient>>,
    ) -> Result<Self, MarketDataError> {
        let mut by_name: HashMap<String, Arc<dyn VendorClient>> = HashMap::new();
        for client in clients {
            let id = client.id().to_string();
            if !configs.iter().any(|c| c.name == id) {
                warn!("Vendor client '{}' has no provider configuration, ignoring", id);
                continue;
            }
            if by_name.insert(id.clone(), client).is_some() {
                warn!("Duplicate vendor client for '{}', keeping the last one", id);
            }
        }

        let providers = configs
            .iter()
            .map(|config| {
                let client = by_name.remove(&config.name);
                if client.is_none() {
                    warn!(
                        "Provider '{}' has no vendor client and will never be selected",
                        config.name
                    );
                }
                ProviderDescriptor::new(
                    config.name.clone(),
                    config.tier,
                    config.priority,
                    config.features.clone(),
                    client,
                )
            })
            .collect();

        Self::new(providers)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers with a vendor client attached.
    pub fn initialized(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().filter(|p| p.is_initialized())
    }

    pub fn by_tier(&self, tier: ProviderTier) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().filter(move |p| p.tier == tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ClientCapabilities, ProviderFeatures};

    struct NamedClient(&'static str);

    #[async_trait::async_trait]
    impl VendorClient for NamedClient {
        fn id(&self) -> &str {
            self.0
        }

        fn capabilities(&self) -> ClientCapabilities {
            ClientCapabilities::default()
        }
    }

    fn configs() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig::new("BLOOMBERG", ProviderTier::Institutional, 1),
            ProviderConfig::new("POLYGON", ProviderTier::Professional, 3),
            ProviderConfig::new("YAHOO", ProviderTier::FreeBackup, 9),
        ]
    }

    #[test]
    fn test_clients_attach_by_name() {
        let clients: Vec<Arc<dyn VendorClient>> = vec![
            Arc::new(NamedClient("POLYGON")),
            Arc::new(NamedClient("YAHOO")),
            Arc::new(NamedClient("UNCONFIGURED")),
        ];
        let catalog = ProviderCatalog::from_config(&configs(), clients).unwrap();

        assert_eq!(catalog.len(), 3);
        assert!(!catalog.get("BLOOMBERG").unwrap().is_initialized());
        assert!(catalog.get("POLYGON").unwrap().is_initialized());
        assert!(catalog.get("UNCONFIGURED").is_none());
        assert_eq!(catalog.initialized().count(), 2);
    }

    #[test]
    fn test_by_tier() {
        let catalog = ProviderCatalog::from_config(&configs(), Vec::new()).unwrap();
        let free: Vec<_> = catalog.by_tier(ProviderTier::FreeBackup).collect();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].name, "YAHOO");
    }

    #[test]
    fn test_duplicate_descriptor_rejected() {
        let descriptor = || {
            ProviderDescriptor::new(
                "POLYGON",
                ProviderTier::Professional,
                3,
                ProviderFeatures::default(),
                None,
            )
        };
        assert!(ProviderCatalog::new(vec![descriptor(), descriptor()]).is_err());
    }
}
