//! Cache trait definition for dependency injection.

use crate::cache::stats::CacheStats;
use crate::cache::types::{CacheError, CacheKey};

/// Cache abstraction for fetched feature-collection bodies.
///
/// The value is always the raw JSON text of a collection, re-parsed on
/// read; the cache never interprets it. Implementations give no atomicity
/// guarantee across get/put on the same key: writes are whole-value
/// replacements and the last writer wins.
///
/// # Example
///
/// ```
/// use heatatlas::cache::{CacheKey, FeatureCache, NoOpCache};
///
/// fn load_with_cache(cache: &dyn FeatureCache, url: &str) -> Option<String> {
///     let key = CacheKey::from_url(url);
///     if let Some(body) = cache.get(&key) {
///         return Some(body);
///     }
///     let body = String::from(r#"{"type":"FeatureCollection","features":[]}"#);
///     cache.put(key, body.clone()).ok();
///     Some(body)
/// }
///
/// let cache = NoOpCache::new();
/// assert!(load_with_cache(&cache, "https://example.fi/wfs").is_some());
/// ```
pub trait FeatureCache: Send + Sync {
    /// Returns the cached body for the key, if present.
    fn get(&self, key: &CacheKey) -> Option<String>;

    /// Stores a body under the key, replacing any previous value whole.
    fn put(&self, key: CacheKey, body: String) -> Result<(), CacheError>;

    /// Returns true if the key is present.
    fn contains(&self, key: &CacheKey) -> bool;

    /// Removes every entry. The only invalidation the cache supports.
    fn clear(&self) -> Result<(), CacheError>;

    /// Returns a snapshot of the cache counters.
    fn stats(&self) -> CacheStats;
}

/// Cache implementation that never stores anything.
///
/// Every read misses, so each load always goes to the network. Useful for
/// tests that count requests and for diagnosing stale-data complaints.
#[derive(Debug, Clone, Default)]
pub struct NoOpCache;

impl NoOpCache {
    /// Creates a new no-op cache.
    pub fn new() -> Self {
        Self
    }
}

impl FeatureCache for NoOpCache {
    fn get(&self, _key: &CacheKey) -> Option<String> {
        None
    }

    fn put(&self, _key: CacheKey, _body: String) -> Result<(), CacheError> {
        Ok(())
    }

    fn contains(&self, _key: &CacheKey) -> bool {
        false
    }

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats::new()
    }
}
