//! Per-provider circuit breaker for fault tolerance.
//!
//! Isolates the gateway from a failing vendor. The circuit has three states:
//!
//! - **Closed**: Normal operation, calls pass through.
//! - **Open**: Vendor is failing, calls are rejected without a network attempt.
//! - **HalfOpen**: Recovery timeout elapsed; the next call is a probe.
//!
//! Thresholds are per provider (set from its tier at registration). The
//! breaker is in-memory and resets on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::time::Instant;

use crate::errors::MarketDataError;

/// Failure threshold for providers that were never registered.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time to wait before transitioning from Open to HalfOpen.
pub const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(300);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - calls are allowed.
    Closed,
    /// Recovery probe - the next call decides.
    HalfOpen,
    /// Vendor is failing - calls are rejected.
    Open,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
            Self::Open => write!(f, "OPEN"),
        }
    }
}

/// Internal circuit state for a single provider.
#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    failure_threshold: u32,
    /// When the circuit last transitioned to Open.
    opened_at: Option<Instant>,
}

impl Circuit {
    fn new(failure_threshold: u32) -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            failure_threshold,
            opened_at: None,
        }
    }

    fn recovery_elapsed(&self, recovery_timeout: Duration) -> bool {
        self.opened_at
            .map(|opened| opened.elapsed() >= recovery_timeout)
            .unwrap_or(true)
    }
}

/// Per-provider circuit breaker.
///
/// Thread-safe: each provider's circuit lives behind one mutex and the lock
/// is never held across an await point.
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    recovery_timeout: Duration,
}

impl CircuitBreaker {
    /// Create a circuit breaker with the default recovery timeout.
    pub fn new() -> Self {
        Self::with_recovery_timeout(DEFAULT_RECOVERY_TIMEOUT)
    }

    pub fn with_recovery_timeout(recovery_timeout: Duration) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            recovery_timeout,
        }
    }

    /// Lock the circuits mutex, recovering from poison if necessary.
    ///
    /// The worst case after a poisoned lock is slightly stale circuit state,
    /// which is preferable to panicking inside the gateway.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Register a provider with its tier threshold. Re-registering keeps state.
    pub fn register(&self, provider: &str, failure_threshold: u32) {
        let mut circuits = self.lock_circuits();
        circuits
            .entry(provider.to_string())
            .or_insert_with(|| Circuit::new(failure_threshold.max(1)));
    }

    /// Admit a call for a provider.
    ///
    /// Returns the state the call runs under, or `CircuitOpen` if the circuit
    /// is open and the recovery timeout has not elapsed. An elapsed Open
    /// circuit transitions to HalfOpen here, before the call's outcome is
    /// recorded.
    pub fn acquire(&self, provider: &str) -> Result<CircuitState, MarketDataError> {
        let mut circuits = self.lock_circuits();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert_with(|| Circuit::new(DEFAULT_FAILURE_THRESHOLD));

        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(circuit.state),
            CircuitState::Open => {
                if circuit.recovery_elapsed(self.recovery_timeout) {
                    info!(
                        "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                        provider
                    );
                    circuit.state = CircuitState::HalfOpen;
                    Ok(CircuitState::HalfOpen)
                } else {
                    Err(MarketDataError::CircuitOpen {
                        provider: provider.to_string(),
                    })
                }
            }
        }
    }

    /// Move every Open circuit whose recovery timeout elapsed to HalfOpen.
    ///
    /// Called once at the start of a request so ranking reads settled state.
    pub fn promote_elapsed(&self) {
        let mut circuits = self.lock_circuits();
        for (provider, circuit) in circuits.iter_mut() {
            if circuit.state == CircuitState::Open
                && circuit.recovery_elapsed(self.recovery_timeout)
            {
                info!(
                    "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                    provider
                );
                circuit.state = CircuitState::HalfOpen;
            }
        }
    }

    /// Record a successful call.
    ///
    /// Resets the failure count; a HalfOpen probe success closes the circuit.
    pub fn record_success(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert_with(|| Circuit::new(DEFAULT_FAILURE_THRESHOLD));

        match circuit.state {
            CircuitState::Closed => {
                if circuit.consecutive_failures > 0 {
                    debug!(
                        "Circuit breaker: success for '{}', failure count reset",
                        provider
                    );
                }
                circuit.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: probe succeeded, closing circuit for '{}'",
                    provider
                );
                circuit.state = CircuitState::Closed;
                circuit.consecutive_failures = 0;
                circuit.opened_at = None;
            }
            CircuitState::Open => {
                // acquire() rejects Open calls, so this only happens when a
                // concurrent request reopened the circuit mid-flight.
                debug!(
                    "Circuit breaker: late success for '{}' in Open state ignored",
                    provider
                );
            }
        }
    }

    /// Record a failed call.
    ///
    /// In Closed state the failure counts toward the threshold. A HalfOpen
    /// probe failure reopens the circuit immediately and restarts the
    /// recovery timer without touching the count.
    pub fn record_failure(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert_with(|| Circuit::new(DEFAULT_FAILURE_THRESHOLD));

        match circuit.state {
            CircuitState::Closed => {
                circuit.consecutive_failures += 1;
                if circuit.consecutive_failures >= circuit.failure_threshold {
                    info!(
                        "Circuit breaker: opening circuit for '{}' after {} failures",
                        provider, circuit.consecutive_failures
                    );
                    circuit.state = CircuitState::Open;
                    circuit.opened_at = Some(Instant::now());
                } else {
                    debug!(
                        "Circuit breaker: failure for '{}' ({}/{})",
                        provider, circuit.consecutive_failures, circuit.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: reopening circuit for '{}' after failed probe",
                    provider
                );
                circuit.state = CircuitState::Open;
                circuit.opened_at = Some(Instant::now());
            }
            CircuitState::Open => {
                debug!(
                    "Circuit breaker: additional failure for '{}' (already open)",
                    provider
                );
            }
        }
    }

    /// Current state for a provider. Reads only; never transitions.
    pub fn state(&self, provider: &str) -> CircuitState {
        let circuits = self.lock_circuits();
        circuits
            .get(provider)
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    pub fn failure_count(&self, provider: &str) -> u32 {
        let circuits = self.lock_circuits();
        circuits
            .get(provider)
            .map(|c| c.consecutive_failures)
            .unwrap_or(0)
    }

    /// Reset the circuit for a provider to Closed state.
    pub fn reset(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        if let Some(circuit) = circuits.get_mut(provider) {
            info!(
                "Circuit breaker: manually resetting circuit for '{}'",
                provider
            );
            circuit.state = CircuitState::Closed;
            circuit.consecutive_failures = 0;
            circuit.opened_at = None;
        }
    }

    /// Get metrics for all tracked providers.
    pub fn metrics(&self) -> Vec<CircuitMetrics> {
        let circuits = self.lock_circuits();
        let mut metrics: Vec<_> = circuits
            .iter()
            .map(|(provider, circuit)| CircuitMetrics {
                provider: provider.clone(),
                state: circuit.state,
                consecutive_failures: circuit.consecutive_failures,
                failure_threshold: circuit.failure_threshold,
                opened_at: circuit.opened_at,
            })
            .collect();
        metrics.sort_by(|a, b| a.provider.cmp(&b.provider));
        metrics
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for a single circuit.
#[derive(Clone, Debug)]
pub struct CircuitMetrics {
    pub provider: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    /// When the circuit last opened.
    pub opened_at: Option<Instant>,
}
