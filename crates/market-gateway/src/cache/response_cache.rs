//! Freshness-checked typed access to the cache store.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use super::key::CacheKey;
use super::store::{CacheStore, CachedValue};
use crate::models::{BarTable, Quote};

/// Typed response cache over a [`CacheStore`].
///
/// Entries are never served past `inserted_at + ttl`, whatever the backing
/// store's own eviction timing. Store errors degrade to cache misses.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    quote_ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, quote_ttl: Duration) -> Self {
        Self { store, quote_ttl }
    }

    pub async fn get_historical(&self, key: &CacheKey) -> Option<BarTable> {
        match self.lookup(key).await? {
            CachedValue::Bars(table) => Some(table),
            CachedValue::Quote(_) => None,
        }
    }

    pub async fn put_historical(&self, key: &CacheKey, table: BarTable) {
        self.store_value(key, CachedValue::Bars(table)).await;
    }

    pub async fn get_quote(&self, symbol: &str) -> Option<Quote> {
        match self.lookup(&CacheKey::quote(symbol)).await? {
            CachedValue::Quote(quote) => Some(quote),
            CachedValue::Bars(_) => None,
        }
    }

    pub async fn put_quote(&self, symbol: &str, quote: Quote) {
        self.store_value(&CacheKey::quote(symbol), CachedValue::Quote(quote))
            .await;
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear response cache: {}", e);
        }
    }

    pub async fn entry_count(&self) -> u64 {
        self.store.entry_count().await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let key_str = key.to_string();
        let entry = match self.store.get(&key_str).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Cache read failed for '{}': {}, treating as miss", key_str, e);
                return None;
            }
        };

        if entry.is_fresh_at(Instant::now()) {
            debug!("Cache hit for '{}'", key_str);
            Some(entry.value)
        } else {
            debug!("Cache entry for '{}' is stale", key_str);
            None
        }
    }

    async fn store_value(&self, key: &CacheKey, value: CachedValue) {
        let key_str = key.to_string();
        let ttl = key.ttl(self.quote_ttl);
        if let Err(e) = self.store.set(&key_str, value, ttl).await {
            warn!("Cache write failed for '{}': {}", key_str, e);
        }
    }
}
