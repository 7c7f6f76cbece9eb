//! Per-provider health scores.
//!
//! A smoothed reliability signal, independent of the breaker's binary state,
//! that the scorer multiplies into each provider's score. Recovery is slow
//! and degradation fast, so a flaky vendor loses preference immediately and
//! only regains it through sustained success.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

/// Initial and maximum health.
pub const MAX_HEALTH: f64 = 1.0;

/// Health never drops below this, so every provider can recover.
pub const MIN_HEALTH: f64 = 0.1;

const SUCCESS_STEP: f64 = 0.01;
const FAILURE_STEP: f64 = 0.1;

pub struct HealthTracker {
    scores: Mutex<HashMap<String, f64>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            scores: Mutex::new(HashMap::new()),
        }
    }

    fn lock_scores(&self) -> MutexGuard<'_, HashMap<String, f64>> {
        self.scores.lock().unwrap_or_else(|poisoned| {
            warn!("Health tracker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Start tracking a provider at full health. Re-registering keeps state.
    pub fn register(&self, provider: &str) {
        self.lock_scores()
            .entry(provider.to_string())
            .or_insert(MAX_HEALTH);
    }

    pub fn record_success(&self, provider: &str) {
        let mut scores = self.lock_scores();
        let score = scores.entry(provider.to_string()).or_insert(MAX_HEALTH);
        *score = (*score + SUCCESS_STEP).min(MAX_HEALTH);
    }

    pub fn record_failure(&self, provider: &str) {
        let mut scores = self.lock_scores();
        let score = scores.entry(provider.to_string()).or_insert(MAX_HEALTH);
        *score = (*score - FAILURE_STEP).max(MIN_HEALTH);
        debug!("Health for '{}' lowered to {:.2}", provider, *score);
    }

    /// Current health; untracked providers report full health.
    pub fn score(&self, provider: &str) -> f64 {
        self.lock_scores()
            .get(provider)
            .copied()
            .unwrap_or(MAX_HEALTH)
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_full_health() {
        let tracker = HealthTracker::new();
        tracker.register("POLYGON");
        assert_eq!(tracker.score("POLYGON"), MAX_HEALTH);
        assert_eq!(tracker.score("UNKNOWN"), MAX_HEALTH);
    }

    #[test]
    fn test_failure_drops_fast_success_recovers_slowly() {
        let tracker = HealthTracker::new();
        tracker.register("POLYGON");

        tracker.record_failure("POLYGON");
        assert!((tracker.score("POLYGON") - 0.9).abs() < 1e-9);

        tracker.record_success("POLYGON");
        assert!((tracker.score("POLYGON") - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_floor_and_ceiling() {
        let tracker = HealthTracker::new();
        for _ in 0..50 {
            tracker.record_failure("DOWN");
        }
        assert_eq!(tracker.score("DOWN"), MIN_HEALTH);

        for _ in 0..500 {
            tracker.record_success("DOWN");
        }
        assert_eq!(tracker.score("DOWN"), MAX_HEALTH);
    }
}
