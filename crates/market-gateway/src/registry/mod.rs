//! Provider registry module.
//!
//! This module provides the per-request orchestration for vendors, including:
//! - Circuit breaking for fault tolerance
//! - Smoothed health scores fed by every outcome
//! - Rate limiting per provider
//! - Ranking of eligible providers for a data type
//! - Sequential failover with per-call timeouts and fetch diagnostics

mod circuit_breaker;
mod failover;
mod health;
mod outcome;
mod rate_limiter;
mod scorer;
mod skip_reason;

pub use circuit_breaker::{CircuitBreaker, CircuitMetrics, CircuitState, DEFAULT_RECOVERY_TIMEOUT};
pub use failover::FailoverExecutor;
pub use health::{HealthTracker, MAX_HEALTH, MIN_HEALTH};
pub use outcome::{DataSource, FetchOutcome};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use scorer::{compute_score, ProviderScorer, ScoredProvider};
pub use skip_reason::{AttemptResult, FetchDiagnostics, ProviderAttempt, SkipReason};
