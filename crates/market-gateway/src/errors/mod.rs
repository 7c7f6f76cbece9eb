//! Error types and retry classification for the market data gateway.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all gateway operations
//! - [`RetryClass`]: Classification for determining failover bookkeeping

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Vendor-level errors never escape the gateway façade; they are absorbed by
/// the failover executor and surface only inside [`FetchDiagnostics`].
///
/// [`FetchDiagnostics`]: crate::registry::FetchDiagnostics
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The call to the provider did not complete within the per-call timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The circuit breaker rejected the call before any network attempt.
    #[error("Circuit open: {provider}")]
    CircuitOpen {
        /// The provider with an open circuit
        provider: String,
    },

    /// The vendor client does not implement the requested operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider lacking the operation
        provider: String,
    },

    /// No provider was eligible or callable for the request.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// Every candidate was tried and every attempt failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// The gateway configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cache backing store failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The configuration document could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::FailoverWithPenalty`]: record a breaker and health failure, try next
    /// - [`RetryClass::NextProvider`]: try next without penalty
    /// - [`RetryClass::CircuitOpen`]: breaker rejected the call, try next
    ///
    /// # Examples
    ///
    /// ```
    /// use market_gateway::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "POLYGON".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::FailoverWithPenalty);
    ///
    /// let error = MarketDataError::CircuitOpen { provider: "POLYGON".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::CircuitOpen);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::NotSupported { .. } => RetryClass::NextProvider,
            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,
            Self::ProviderError { .. }
            | Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::NoProvidersAvailable
            | Self::AllProvidersFailed
            | Self::InvalidConfig(_)
            | Self::Cache(_)
            | Self::ConfigParse(_) => RetryClass::FailoverWithPenalty,
        }
    }
}
