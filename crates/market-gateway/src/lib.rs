//! Market Data Gateway Crate
//!
//! Resilient data acquisition in front of several third-party market-data
//! vendors of differing cost, reliability, and capability tiers.
//!
//! # Overview
//!
//! For every request the gateway:
//! - Serves fresh cached responses without touching a vendor
//! - Ranks eligible vendors by reliability, preference, capability, cost and health
//! - Fails over through the ranked list, one vendor at a time, under each
//!   vendor's circuit breaker
//! - Feeds every outcome back into a per-vendor health score
//!
//! # Architecture
//!
//! ```text
//! caller --> MarketDataGateway --> ResponseCache (hit returns immediately)
//!                   |
//!                   v
//!            ProviderScorer  (eligibility + score, reads CircuitBreaker & HealthTracker)
//!                   |
//!                   v
//!           FailoverExecutor (sequential attempts, breaker-gated, rate limited,
//!                   |         per-call timeout)
//!                   v
//!             VendorClient   (external collaborator)
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataGateway`] - The façade tying everything together
//! - [`ProviderCatalog`] / [`ProviderDescriptor`] - Immutable per-vendor facts
//! - [`VendorClient`] - Capability-tagged vendor adapter trait
//! - [`FetchOutcome`] - Explicit data / empty / unavailable result
//! - [`GatewayConfig`] - Constructor-injected configuration

pub mod cache;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod registry;

pub use cache::{CacheEntry, CacheKey, CacheStore, CachedValue, MokaCacheStore, ResponseCache};
pub use config::{GatewayConfig, ProviderConfig};
pub use errors::{MarketDataError, RetryClass};
pub use gateway::{MarketDataGateway, ProviderStatus, RankedProvider};
pub use models::{
    Bar, BarTable, DataType, HistoricalRequest, Interval, ProviderId, Quote, Requirements,
};
pub use provider::{
    ClientCapabilities, Operation, ProviderCatalog, ProviderDescriptor, ProviderFeatures,
    ProviderTier, RequestsPerMinute, VendorClient,
};
pub use registry::{
    AttemptResult, CircuitBreaker, CircuitMetrics, CircuitState, DataSource, FetchDiagnostics,
    FetchOutcome, HealthTracker, ProviderAttempt, ProviderScorer, RateLimiter, ScoredProvider,
    SkipReason,
};
