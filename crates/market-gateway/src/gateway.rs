//! Gateway façade.
//!
//! The gateway owns all mutable state (breakers, health, rate limits, cache)
//! for one set of configured vendors. Every public fetch operation:
//! - Checks the response cache
//! - Ranks eligible providers for the data type
//! - Orders candidates: the primary (override or top ranked) first, then the
//!   rest by ascending priority
//! - Fails over through the candidates and caches the first success
//!
//! Vendor errors never escape; total failure is reported as an empty result.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;

use crate::cache::{CacheKey, CacheStore, MokaCacheStore, ResponseCache};
use crate::config::GatewayConfig;
use crate::errors::MarketDataError;
use crate::models::{BarTable, DataType, HistoricalRequest, Quote, Requirements};
use crate::provider::{
    Operation, ProviderCatalog, ProviderDescriptor, ProviderTier, RequestsPerMinute, VendorClient,
};
use crate::registry::{
    CircuitBreaker, CircuitMetrics, CircuitState, DataSource, FailoverExecutor, FetchDiagnostics,
    FetchOutcome, HealthTracker, ProviderScorer, RateLimitConfig, RateLimiter, ScoredProvider,
};

/// Per-provider status snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub tier: ProviderTier,
    pub priority: u8,
    pub initialized: bool,
    pub circuit_state: CircuitState,
    pub failure_count: u32,
    pub health_score: f64,
    pub monthly_cost: f64,
    pub reliability_score: f64,
    pub supports_real_time_stream: bool,
    pub supports_nanosecond_timestamps: bool,
    pub supports_tick_data: bool,
    pub supports_options: bool,
    pub supports_fundamentals: bool,
    pub supports_news_sentiment: bool,
    pub historical_depth_years: u32,
    pub max_websocket_connections: u32,
    pub requests_per_minute: RequestsPerMinute,
    /// Tokens left in the rate limit bucket, `None` when unlimited.
    pub remaining_tokens: Option<f64>,
}

/// A provider's position in a ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedProvider {
    pub name: String,
    pub tier: ProviderTier,
    pub priority: u8,
    pub score: f64,
}

/// Resilient market data gateway.
pub struct MarketDataGateway {
    catalog: ProviderCatalog,
    circuit_breaker: CircuitBreaker,
    health: HealthTracker,
    rate_limiter: RateLimiter,
    cache: ResponseCache,
    call_timeout: Duration,
}

impl MarketDataGateway {
    /// Create a gateway with the in-memory Moka cache.
    pub fn new(
        config: GatewayConfig,
        clients: Vec<Arc<dyn VendorClient>>,
    ) -> Result<Self, MarketDataError> {
        let store = Arc::new(MokaCacheStore::new(config.cache_max_capacity));
        Self::with_cache_store(config, clients, store)
    }

    /// Create a gateway with a custom cache backing store.
    pub fn with_cache_store(
        config: GatewayConfig,
        clients: Vec<Arc<dyn VendorClient>>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, MarketDataError> {
        config.validate()?;
        let catalog = ProviderCatalog::from_config(&config.providers, clients)?;

        let circuit_breaker = CircuitBreaker::with_recovery_timeout(config.recovery_timeout());
        let health = HealthTracker::new();
        let rate_limiter = RateLimiter::new();

        for descriptor in catalog.iter() {
            circuit_breaker.register(&descriptor.name, descriptor.tier.failure_threshold());
            health.register(&descriptor.name);
            if let Some(rpm) = descriptor.features.requests_per_minute.limit() {
                rate_limiter.configure(
                    &descriptor.name,
                    RateLimitConfig {
                        requests_per_minute: rpm,
                        burst_capacity: config.rate_limit_burst.min(rpm).max(1) as f64,
                    },
                );
            }
        }

        info!(
            "Market data gateway initialized with {} providers ({} with clients)",
            catalog.len(),
            catalog.initialized().count()
        );

        Ok(Self {
            catalog,
            circuit_breaker,
            health,
            rate_limiter,
            cache: ResponseCache::new(store, config.quote_ttl()),
            call_timeout: config.call_timeout(),
        })
    }

    /// Fetch historical bars, reporting where they came from or why none came.
    ///
    /// With a `provider_override` the cache is not read, so the named
    /// provider is asked first; a successful answer still refreshes the cache.
    pub async fn fetch_historical(
        &self,
        request: &HistoricalRequest,
        provider_override: Option<&str>,
    ) -> FetchOutcome<BarTable> {
        let key = CacheKey::historical(request);
        if provider_override.is_none() {
            if let Some(table) = self.cache.get_historical(&key).await {
                return FetchOutcome::Data {
                    data: table,
                    source: DataSource::Cache,
                };
            }
        }

        let outcome = self
            .execute(
                DataType::HistoricalBars,
                &request.requirements,
                Operation::HistoricalData,
                provider_override,
                |client| async move { client.get_historical_data(request).await },
            )
            .await;

        if let FetchOutcome::Data { data, .. } = &outcome {
            if data.is_empty() {
                debug!("Not caching empty historical result for '{}'", key);
            } else {
                self.cache.put_historical(&key, data.clone()).await;
            }
        }
        outcome
    }

    /// Historical bars for the request; an empty table when no data is available.
    pub async fn get_historical_data(
        &self,
        request: &HistoricalRequest,
        provider_override: Option<&str>,
    ) -> BarTable {
        self.fetch_historical(request, provider_override)
            .await
            .into_data()
            .unwrap_or_default()
    }

    /// Fetch the current quote, reporting where it came from or why none came.
    ///
    /// Cache reads follow the same override rule as [`Self::fetch_historical`].
    pub async fn fetch_quote(
        &self,
        symbol: &str,
        provider_override: Option<&str>,
    ) -> FetchOutcome<Quote> {
        if provider_override.is_none() {
            if let Some(quote) = self.cache.get_quote(symbol).await {
                return FetchOutcome::Data {
                    data: quote,
                    source: DataSource::Cache,
                };
            }
        }

        let outcome = self
            .execute(
                DataType::RealTimeQuote,
                &Requirements::real_time(),
                Operation::RealTimeQuote,
                provider_override,
                |client| async move { client.get_real_time_quote(symbol).await },
            )
            .await;

        if let FetchOutcome::Data { data, .. } = &outcome {
            self.cache.put_quote(symbol, data.clone()).await;
        }
        outcome
    }

    /// Current quote for the symbol; `None` when no data is available.
    pub async fn get_real_time_quote(
        &self,
        symbol: &str,
        provider_override: Option<&str>,
    ) -> Option<Quote> {
        self.fetch_quote(symbol, provider_override).await.into_data()
    }

    /// Status snapshot of every cataloged provider, keyed by name.
    pub fn get_provider_status(&self) -> BTreeMap<String, ProviderStatus> {
        self.catalog
            .iter()
            .map(|descriptor| {
                let name: &str = &descriptor.name;
                let features = &descriptor.features;
                let status = ProviderStatus {
                    tier: descriptor.tier,
                    priority: descriptor.priority,
                    initialized: descriptor.is_initialized(),
                    circuit_state: self.circuit_breaker.state(name),
                    failure_count: self.circuit_breaker.failure_count(name),
                    health_score: self.health.score(name),
                    monthly_cost: features.monthly_cost,
                    reliability_score: features.reliability_score,
                    supports_real_time_stream: features.supports_real_time_stream,
                    supports_nanosecond_timestamps: features.supports_nanosecond_timestamps,
                    supports_tick_data: features.supports_tick_data,
                    supports_options: features.supports_options,
                    supports_fundamentals: features.supports_fundamentals,
                    supports_news_sentiment: features.supports_news_sentiment,
                    historical_depth_years: features.historical_depth_years,
                    max_websocket_connections: features.max_websocket_connections,
                    requests_per_minute: features.requests_per_minute,
                    remaining_tokens: self.rate_limiter.remaining_tokens(name),
                };
                (name.to_string(), status)
            })
            .collect()
    }

    /// Probe every provider concurrently, updating health scores.
    ///
    /// Providers without a client report `false`. Clients without a health
    /// probe report `true` and leave health untouched.
    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        let probes = self.catalog.iter().map(|descriptor| async move {
            (descriptor.name.to_string(), self.probe(descriptor).await)
        });
        join_all(probes).await.into_iter().collect()
    }

    /// Rank providers for a data type as a fetch would right now.
    pub fn rank_providers(
        &self,
        data_type: DataType,
        requirements: &Requirements,
    ) -> Vec<RankedProvider> {
        self.circuit_breaker.promote_elapsed();
        let mut diagnostics = FetchDiagnostics::new();
        self.scorer()
            .rank(data_type, requirements, &mut diagnostics)
            .into_iter()
            .map(|scored| RankedProvider {
                name: scored.descriptor.name.to_string(),
                tier: scored.descriptor.tier,
                priority: scored.descriptor.priority,
                score: scored.score,
            })
            .collect()
    }

    /// Close a provider's circuit and clear its failure count.
    pub fn reset_circuit(&self, provider: &str) {
        info!("Resetting circuit for provider '{}'", provider);
        self.circuit_breaker.reset(provider);
    }

    pub fn is_circuit_open(&self, provider: &str) -> bool {
        self.circuit_breaker.state(provider) == CircuitState::Open
    }

    pub fn circuit_state(&self, provider: &str) -> CircuitState {
        self.circuit_breaker.state(provider)
    }

    pub fn circuit_metrics(&self) -> Vec<CircuitMetrics> {
        self.circuit_breaker.metrics()
    }

    pub fn health_score(&self, provider: &str) -> f64 {
        self.health.score(provider)
    }

    /// Drop every cached response.
    pub async fn invalidate_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count().await
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    fn scorer(&self) -> ProviderScorer<'_> {
        ProviderScorer::new(&self.catalog, &self.circuit_breaker, &self.health)
    }

    async fn execute<T, F, Fut>(
        &self,
        data_type: DataType,
        requirements: &Requirements,
        operation: Operation,
        provider_override: Option<&str>,
        call: F,
    ) -> FetchOutcome<T>
    where
        F: FnMut(Arc<dyn VendorClient>) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        self.circuit_breaker.promote_elapsed();

        let mut diagnostics = FetchDiagnostics::new();
        let ranked = self.scorer().rank(data_type, requirements, &mut diagnostics);
        let candidates = self.order_candidates(&ranked, provider_override);

        debug!(
            "Candidates for {}: [{}]",
            operation,
            candidates
                .iter()
                .map(|d| &*d.name)
                .collect::<Vec<&str>>()
                .join(", ")
        );

        FailoverExecutor::new(
            &self.circuit_breaker,
            &self.health,
            &self.rate_limiter,
            self.call_timeout,
        )
        .execute(operation, &candidates, diagnostics, call)
        .await
    }

    /// Primary first, remaining ranked providers by ascending priority.
    ///
    /// An override becomes primary when it is cataloged, initialized and its
    /// circuit is not open; otherwise it is ignored.
    fn order_candidates<'a>(
        &'a self,
        ranked: &[ScoredProvider<'a>],
        provider_override: Option<&str>,
    ) -> Vec<&'a ProviderDescriptor> {
        let primary = provider_override
            .and_then(|name| self.override_primary(name))
            .or_else(|| ranked.first().map(|scored| scored.descriptor));

        let Some(primary) = primary else {
            return Vec::new();
        };

        let mut rest: Vec<&'a ProviderDescriptor> = ranked
            .iter()
            .map(|scored| scored.descriptor)
            .filter(|d| d.name != primary.name)
            .collect();
        rest.sort_by_key(|d| d.priority);

        let mut candidates = Vec::with_capacity(rest.len() + 1);
        candidates.push(primary);
        candidates.extend(rest);
        candidates
    }

    fn override_primary(&self, name: &str) -> Option<&ProviderDescriptor> {
        let Some(descriptor) = self.catalog.get(name) else {
            warn!("Provider override '{}' is not configured, ignoring", name);
            return None;
        };
        if !descriptor.is_initialized() {
            warn!("Provider override '{}' has no client, ignoring", name);
            return None;
        }
        if self.circuit_breaker.state(name) == CircuitState::Open {
            warn!("Provider override '{}' has an open circuit, ignoring", name);
            return None;
        }
        Some(descriptor)
    }

    async fn probe(&self, descriptor: &ProviderDescriptor) -> bool {
        let provider: &str = &descriptor.name;
        let Some(client) = descriptor.client() else {
            debug!("Provider '{}' has no client, reporting unhealthy", provider);
            return false;
        };
        if !client.capabilities().supports(Operation::HealthCheck) {
            debug!("Provider '{}' has no health probe, assuming healthy", provider);
            return true;
        }

        match tokio::time::timeout(self.call_timeout, client.health_check()).await {
            Ok(Ok(true)) => {
                self.health.record_success(provider);
                true
            }
            Ok(Ok(false)) => {
                warn!("Health check for provider '{}' reported unhealthy", provider);
                self.health.record_failure(provider);
                false
            }
            Ok(Err(e)) => {
                warn!("Health check failed for provider '{}': {}", provider, e);
                self.health.record_failure(provider);
                false
            }
            Err(_) => {
                warn!("Health check timed out for provider '{}'", provider);
                self.health.record_failure(provider);
                false
            }
        }
    }
}

impl std::fmt::Debug for MarketDataGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataGateway")
            .field("providers", &self.catalog.len())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
