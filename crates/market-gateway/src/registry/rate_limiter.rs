//! Token bucket rate limiter for market data providers.
//!
//! Enforces each provider's configured `requests_per_minute`. Each limited
//! provider gets its own bucket; providers without a configured limit are
//! never throttled. Callers never wait for a token: an empty bucket means the
//! request moves on to another provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::warn;
use tokio::time::Instant;

/// Token bucket for a single provider.
#[derive(Debug)]
struct TokenBucket {
    /// Current number of available tokens.
    tokens: f64,
    /// Last time the bucket was updated.
    last_update: Instant,
    /// Token refill rate (tokens per second).
    rate: f64,
    /// Maximum bucket capacity.
    capacity: f64,
}

impl TokenBucket {
    fn with_config(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: config.requests_per_minute.max(1) as f64 / 60.0,
            capacity,
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limit configuration for a provider.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    /// Maximum burst capacity.
    pub burst_capacity: f64,
}

/// Per-provider token bucket rate limiter.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the buckets mutex, recovering from poison if necessary.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Limit a provider. Replaces any existing bucket with a full one.
    pub fn configure(&self, provider: &str, config: RateLimitConfig) {
        self.lock_buckets()
            .insert(provider.to_string(), TokenBucket::with_config(&config));
    }

    /// Take a token if one is free. Never waits.
    ///
    /// Always succeeds for providers without a configured limit.
    pub fn try_acquire(&self, provider: &str) -> bool {
        match self.lock_buckets().get_mut(provider) {
            Some(bucket) => bucket.try_acquire(),
            None => true,
        }
    }

    /// Remaining tokens, or `None` for unlimited providers.
    pub fn remaining_tokens(&self, provider: &str) -> Option<f64> {
        self.lock_buckets().get_mut(provider).map(|bucket| {
            bucket.refill();
            bucket.tokens
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limited(rpm: u32, burst: f64) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute: rpm,
            burst_capacity: burst,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_provider_is_unlimited() {
        let limiter = RateLimiter::new();
        for _ in 0..1_000 {
            assert!(limiter.try_acquire("UNLIMITED"));
        }
        assert_eq!(limiter.remaining_tokens("UNLIMITED"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_capacity_respected() {
        let limiter = RateLimiter::new();
        limiter.configure("LIMITED", limited(120, 5.0));

        for _ in 0..5 {
            assert!(limiter.try_acquire("LIMITED"));
        }
        assert!(!limiter.try_acquire("LIMITED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_over_time() {
        let limiter = RateLimiter::new();
        limiter.configure("REFILL", limited(60, 1.0)); // 1 token/second

        assert!(limiter.try_acquire("REFILL"));
        assert!(!limiter.try_acquire("REFILL"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.try_acquire("REFILL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_provider_isolation() {
        let limiter = RateLimiter::new();
        limiter.configure("PROVIDER_A", limited(60, 2.0));
        limiter.configure("PROVIDER_B", limited(60, 2.0));

        limiter.try_acquire("PROVIDER_A");
        limiter.try_acquire("PROVIDER_A");
        assert!(!limiter.try_acquire("PROVIDER_A"));

        assert!(limiter.try_acquire("PROVIDER_B"));
    }
}
