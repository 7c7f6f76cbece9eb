//! Response cache.
//!
//! Short-lived memoization of successful vendor responses:
//! - `key` - request signature and TTL policy
//! - `store` - the pluggable backing store (`CacheStore`) and its Moka default
//! - `response_cache` - freshness-checked typed access used by the gateway

mod key;
mod response_cache;
mod store;

pub use key::CacheKey;
pub use response_cache::ResponseCache;
pub use store::{CacheEntry, CacheStore, CachedValue, MokaCacheStore};
