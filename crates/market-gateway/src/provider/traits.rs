//! Vendor client trait definitions.
//!
//! This module defines the `VendorClient` trait that every vendor adapter
//! implements. Authentication, pagination and payload parsing are the
//! adapter's concern; the gateway only sees normalized models.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{BarTable, HistoricalRequest, Quote};

use super::capabilities::{ClientCapabilities, Operation};

/// Trait for vendor adapters.
///
/// Implement this trait to plug a market-data vendor into the gateway.
/// Adapters declare which operations they implement through
/// [`capabilities`](Self::capabilities) and only need to override the
/// matching methods.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use market_gateway::provider::{ClientCapabilities, VendorClient};
///
/// struct FredClient {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl VendorClient for FredClient {
///     fn id(&self) -> &str {
///         "FRED"
///     }
///
///     fn capabilities(&self) -> ClientCapabilities {
///         ClientCapabilities {
///             historical_data: true,
///             ..Default::default()
///         }
///     }
///
///     // ... implement get_historical_data
/// }
/// ```
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Vendor name; must match the provider's configured name.
    fn id(&self) -> &str;

    /// Operations this adapter implements.
    fn capabilities(&self) -> ClientCapabilities;

    /// Fetch OHLCV bars for every requested symbol in the range.
    async fn get_historical_data(
        &self,
        request: &HistoricalRequest,
    ) -> Result<BarTable, MarketDataError> {
        let _ = request;
        Err(self.not_supported(Operation::HistoricalData))
    }

    /// Fetch the current quote for a symbol.
    async fn get_real_time_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let _ = symbol;
        Err(self.not_supported(Operation::RealTimeQuote))
    }

    /// Cheap liveness probe. `Ok(false)` means reachable but degraded.
    async fn health_check(&self) -> Result<bool, MarketDataError> {
        Err(self.not_supported(Operation::HealthCheck))
    }

    #[doc(hidden)]
    fn not_supported(&self, operation: Operation) -> MarketDataError {
        MarketDataError::NotSupported {
            operation: operation.to_string(),
            provider: self.id().to_string(),
        }
    }
}
