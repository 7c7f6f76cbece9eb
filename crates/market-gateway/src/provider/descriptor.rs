use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::capabilities::ProviderFeatures;
use super::traits::VendorClient;
use crate::models::ProviderId;

/// Cost/quality classification of a vendor.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderTier {
    /// Expensive, most reliable, broad capability.
    Institutional,
    /// Mid-tier.
    Professional,
    /// Low or no cost, reduced capability, last resort.
    FreeBackup,
}

impl ProviderTier {
    /// Consecutive failures before the breaker opens.
    ///
    /// Premium vendors are held to a stricter standard.
    pub fn failure_threshold(&self) -> u32 {
        match self {
            Self::Institutional => 3,
            Self::Professional => 5,
            Self::FreeBackup => 10,
        }
    }
}

impl fmt::Display for ProviderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Institutional => write!(f, "INSTITUTIONAL"),
            Self::Professional => write!(f, "PROFESSIONAL"),
            Self::FreeBackup => write!(f, "FREE_BACKUP"),
        }
    }
}

/// Immutable per-vendor configuration.
///
/// A descriptor without a client stays cataloged but is never selected.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub name: ProviderId,
    pub tier: ProviderTier,
    /// Lower is preferred.
    pub priority: u8,
    pub features: ProviderFeatures,
    client: Option<Arc<dyn VendorClient>>,
}

impl ProviderDescriptor {
    pub fn new(
        name: impl Into<ProviderId>,
        tier: ProviderTier,
        priority: u8,
        features: ProviderFeatures,
        client: Option<Arc<dyn VendorClient>>,
    ) -> Self {
        Self {
            name: name.into(),
            tier,
            priority,
            features,
            client,
        }
    }

    pub fn client(&self) -> Option<&Arc<dyn VendorClient>> {
        self.client.as_ref()
    }

    /// Whether a vendor client is attached.
    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .field("priority", &self.priority)
            .field("features", &self.features)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
