//! Gateway configuration.
//!
//! Configuration is constructor-injected: build a [`GatewayConfig`] (in code,
//! from JSON, or from defaults plus environment overrides) and hand it to
//! [`MarketDataGateway::new`](crate::MarketDataGateway::new).

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::provider::{ProviderFeatures, ProviderTier};

/// Default per-call timeout for vendor requests and health probes.
const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// Default time an open circuit waits before allowing a probe.
const DEFAULT_RECOVERY_TIMEOUT_SECS: u64 = 300;

/// Default freshness window for cached quotes.
const DEFAULT_QUOTE_TTL_SECS: u64 = 30;

/// Default maximum number of cached responses.
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Default token bucket size for rate-limited providers.
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Static configuration for one vendor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub tier: ProviderTier,
    /// Lower is preferred.
    pub priority: u8,
    #[serde(default)]
    pub features: ProviderFeatures,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, tier: ProviderTier, priority: u8) -> Self {
        Self {
            name: name.into(),
            tier,
            priority,
            features: ProviderFeatures::default(),
        }
    }

    pub fn with_features(mut self, features: ProviderFeatures) -> Self {
        self.features = features;
        self
    }
}

/// Gateway configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub providers: Vec<ProviderConfig>,
    pub call_timeout_ms: u64,
    pub recovery_timeout_secs: u64,
    pub quote_ttl_secs: u64,
    pub cache_max_capacity: u64,
    pub rate_limit_burst: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            recovery_timeout_secs: DEFAULT_RECOVERY_TIMEOUT_SECS,
            quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
            cache_max_capacity: DEFAULT_CACHE_CAPACITY,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

impl GatewayConfig {
    pub fn with_providers(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers,
            ..Default::default()
        }
    }

    /// Parse a JSON configuration document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MDG_*` environment overrides on top of this configuration.
    ///
    /// Unparseable values are ignored and the current value is kept.
    pub fn apply_env(mut self) -> Self {
        self.call_timeout_ms = env_or("MDG_CALL_TIMEOUT_MS", self.call_timeout_ms);
        self.recovery_timeout_secs =
            env_or("MDG_RECOVERY_TIMEOUT_SECS", self.recovery_timeout_secs);
        self.quote_ttl_secs = env_or("MDG_QUOTE_TTL_SECS", self.quote_ttl_secs);
        self.cache_max_capacity = env_or("MDG_CACHE_CAPACITY", self.cache_max_capacity);
        self.rate_limit_burst = env_or("MDG_RATE_LIMIT_BURST", self.rate_limit_burst);
        self
    }

    /// Reject configurations the gateway cannot honor.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(MarketDataError::InvalidConfig(
                    "provider name must not be empty".to_string(),
                ));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(MarketDataError::InvalidConfig(format!(
                    "duplicate provider '{}'",
                    provider.name
                )));
            }
            let reliability = provider.features.reliability_score;
            if !(0.0..=1.0).contains(&reliability) {
                return Err(MarketDataError::InvalidConfig(format!(
                    "provider '{}' reliability_score {} outside [0, 1]",
                    provider.name, reliability
                )));
            }
            if provider.features.monthly_cost < 0.0 {
                return Err(MarketDataError::InvalidConfig(format!(
                    "provider '{}' monthly_cost must not be negative",
                    provider.name
                )));
            }
        }
        if self.call_timeout_ms == 0 {
            return Err(MarketDataError::InvalidConfig(
                "call_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.recovery_timeout_secs)
    }

    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, current: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(current)
}
