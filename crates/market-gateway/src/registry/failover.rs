//! Failover executor.
//!
//! Walks an ordered candidate list strictly sequentially, stopping at the
//! first success. Every attempt is gated by the candidate's circuit breaker
//! and its rate-limit bucket, bounded by the per-call timeout, and reported to
//! both the breaker and the health tracker. A circuit-open rejection costs the
//! same health decrement as a failed call. A provider without a free token is
//! skipped without waiting. The executor never returns an error: total
//! exhaustion is an explicit [`FetchOutcome`] variant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::health::HealthTracker;
use super::outcome::{DataSource, FetchOutcome};
use super::rate_limiter::RateLimiter;
use super::skip_reason::{FetchDiagnostics, SkipReason};
use crate::errors::{MarketDataError, RetryClass};
use crate::provider::{Operation, ProviderDescriptor, VendorClient};

pub struct FailoverExecutor<'a> {
    circuit_breaker: &'a CircuitBreaker,
    health: &'a HealthTracker,
    rate_limiter: &'a RateLimiter,
    call_timeout: Duration,
}

impl<'a> FailoverExecutor<'a> {
    pub fn new(
        circuit_breaker: &'a CircuitBreaker,
        health: &'a HealthTracker,
        rate_limiter: &'a RateLimiter,
        call_timeout: Duration,
    ) -> Self {
        Self {
            circuit_breaker,
            health,
            rate_limiter,
            call_timeout,
        }
    }

    /// Run `call` against each candidate in order until one succeeds.
    ///
    /// `diagnostics` carries skips already recorded during ranking.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: Operation,
        candidates: &[&ProviderDescriptor],
        mut diagnostics: FetchDiagnostics,
        mut call: F,
    ) -> FetchOutcome<T>
    where
        F: FnMut(Arc<dyn VendorClient>) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        for descriptor in candidates {
            let provider: &str = &descriptor.name;

            let Some(client) = descriptor.client() else {
                diagnostics.record_skip(descriptor.name.clone(), SkipReason::NotInitialized);
                continue;
            };

            if !client.capabilities().supports(operation) {
                debug!(
                    "Provider '{}' does not implement {}, skipping",
                    provider, operation
                );
                diagnostics.record_skip(
                    descriptor.name.clone(),
                    SkipReason::OperationNotSupported { operation },
                );
                continue;
            }

            if let Err(e) = self.circuit_breaker.acquire(provider) {
                info!("Circuit open for provider '{}', call rejected: {}", provider, e);
                self.health.record_failure(provider);
                diagnostics.record_error(descriptor.name.clone(), e.to_string());
                continue;
            }

            if !self.rate_limiter.try_acquire(provider) {
                debug!("Provider '{}' out of rate-limit tokens, trying next", provider);
                diagnostics.record_skip(descriptor.name.clone(), SkipReason::RateLimited);
                continue;
            }

            debug!("Calling provider '{}' for {}", provider, operation);
            let result = match tokio::time::timeout(self.call_timeout, call(Arc::clone(client)))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout {
                    provider: provider.to_string(),
                }),
            };

            match result {
                Ok(data) => {
                    self.circuit_breaker.record_success(provider);
                    self.health.record_success(provider);
                    diagnostics.record_success(descriptor.name.clone());
                    debug!("Provider '{}' served {}", provider, operation);
                    return FetchOutcome::Data {
                        data,
                        source: DataSource::Provider(descriptor.name.clone()),
                    };
                }
                Err(e) => match e.retry_class() {
                    RetryClass::FailoverWithPenalty => {
                        self.circuit_breaker.record_failure(provider);
                        self.health.record_failure(provider);
                        warn!("Provider '{}' failed {}: {}", provider, operation, e);
                        diagnostics.record_error(descriptor.name.clone(), e.to_string());
                    }
                    RetryClass::NextProvider => {
                        debug!(
                            "Provider '{}' declined {}: {}, trying next provider",
                            provider, operation, e
                        );
                        diagnostics.record_skip(
                            descriptor.name.clone(),
                            SkipReason::OperationNotSupported { operation },
                        );
                    }
                    RetryClass::CircuitOpen => {
                        info!("Provider '{}' reported open circuit: {}", provider, e);
                        self.circuit_breaker.record_failure(provider);
                        self.health.record_failure(provider);
                        diagnostics.record_error(descriptor.name.clone(), e.to_string());
                    }
                },
            }
        }

        if diagnostics.has_errors() {
            warn!(
                "All providers failed for {}. Diagnostics: {}",
                operation,
                diagnostics.summary()
            );
            FetchOutcome::Unavailable { diagnostics }
        } else {
            warn!(
                "No provider could serve {}. Diagnostics: {}",
                operation,
                diagnostics.summary()
            );
            FetchOutcome::Empty { diagnostics }
        }
    }
}
