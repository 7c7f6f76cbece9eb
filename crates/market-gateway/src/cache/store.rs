//! Cache backing store abstraction and the in-memory Moka implementation.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::models::{BarTable, Quote};

/// Cached response payload.
#[derive(Clone, Debug, PartialEq)]
pub enum CachedValue {
    Bars(BarTable),
    Quote(Quote),
}

/// A stored response with its insertion time and lifetime.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(value: CachedValue, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the entry may still be served at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < self.ttl
    }
}

/// Backing store for cached responses. In-process or remote.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, MarketDataError>;

    /// Store `value` under `key`, overwriting any previous entry.
    async fn set(&self, key: &str, value: CachedValue, ttl: Duration)
        -> Result<(), MarketDataError>;

    async fn invalidate(&self, key: &str) -> Result<(), MarketDataError>;

    async fn clear(&self) -> Result<(), MarketDataError>;

    async fn entry_count(&self) -> u64;
}

/// Expires each Moka entry after its own TTL.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache store.
///
/// Moka bounds memory and evicts expired entries; freshness for serving is
/// still decided by [`CacheEntry::is_fresh_at`].
#[derive(Clone)]
pub struct MokaCacheStore {
    cache: Cache<String, CacheEntry>,
}

impl MokaCacheStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, MarketDataError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(
        &self,
        key: &str,
        value: CachedValue,
        ttl: Duration,
    ) -> Result<(), MarketDataError> {
        self.cache
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), MarketDataError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), MarketDataError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for MokaCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheStore")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn quote_value() -> CachedValue {
        CachedValue::Quote(Quote::new("AAPL", Utc::now(), dec!(190), "USD", "POLYGON"))
    }

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let store = MokaCacheStore::new(100);
        store
            .set("quote:AAPL", quote_value(), Duration::from_secs(30))
            .await
            .unwrap();

        let entry = store.get("quote:AAPL").await.unwrap().unwrap();
        assert_eq!(entry.value, quote_value());
        assert_eq!(entry.ttl, Duration::from_secs(30));
        assert_eq!(store.entry_count().await, 1);

        store.invalidate("quote:AAPL").await.unwrap();
        assert!(store.get("quote:AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MokaCacheStore::new(100);
        store
            .set("a", quote_value(), Duration::from_secs(30))
            .await
            .unwrap();
        store
            .set("b", quote_value(), Duration::from_secs(30))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.entry_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_freshness_boundary() {
        let entry = CacheEntry::new(quote_value(), Duration::from_secs(60));
        let inserted = entry.inserted_at;

        assert!(entry.is_fresh_at(inserted + Duration::from_secs(59)));
        assert!(!entry.is_fresh_at(inserted + Duration::from_secs(60)));
    }
}
