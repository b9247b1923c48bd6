//! Cache-aside feature loading.
//!
//! The loader is the single path every dataset takes into memory: check
//! the persistent cache for the request URL, fall through to the network
//! on a miss, write the raw body back, and hand the parsed collection to
//! the caller. Cached data is trusted forever (no staleness check), and
//! any failure degrades to "no data" - callers receive `None` and render
//! an empty state while the failure is logged. Nothing is cached on
//! failure, so the next attempt always retries the network.

use crate::cache::{CacheKey, FeatureCache};
use crate::feature::{self, FeatureCollection};
use crate::source::{AreaFilter, AsyncHttpClient, FeatureSource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache-aside accessor combining the HTTP client and the feature cache.
pub struct FeatureLoader<C: AsyncHttpClient> {
    http: C,
    cache: Arc<dyn FeatureCache>,
}

impl<C: AsyncHttpClient> FeatureLoader<C> {
    /// Creates a loader over the given client and cache.
    pub fn new(http: C, cache: Arc<dyn FeatureCache>) -> Self {
        Self { http, cache }
    }

    /// Loads the collection behind a request URL.
    ///
    /// Returns `None` on network or parse failure; both are logged and
    /// neither is retried here.
    pub async fn load(&self, url: &str, layer_name: &str) -> Option<FeatureCollection> {
        let key = CacheKey::from_url(url);

        if let Some(body) = self.cache.get(&key) {
            match feature::parse_collection(&body, layer_name, url) {
                Ok(collection) => {
                    debug!(url = url, features = collection.len(), "cache hit");
                    return Some(collection);
                }
                Err(e) => {
                    // A corrupt entry falls through to a refetch, which
                    // overwrites it on success.
                    warn!(url = url, error = %e, "cached body failed to parse, refetching");
                }
            }
        }

        let bytes = match self.http.get(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = url, error = %e, "feature fetch failed, treating as no data");
                return None;
            }
        };

        let body = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(url = url, error = %e, "response was not UTF-8, treating as no data");
                return None;
            }
        };

        match feature::parse_collection(&body, layer_name, url) {
            Ok(collection) => {
                if let Err(e) = self.cache.put(key, body) {
                    // Cache write failure degrades to uncached operation.
                    warn!(url = url, error = %e, "cache write failed");
                }
                debug!(url = url, features = collection.len(), "fetched and cached");
                Some(collection)
            }
            Err(e) => {
                warn!(url = url, error = %e, "feature parse failed, treating as no data");
                None
            }
        }
    }

    /// Loads a source's collection for an area filter.
    pub async fn load_source(
        &self,
        source: &dyn FeatureSource,
        filter: &AreaFilter,
    ) -> Option<FeatureCollection> {
        let url = source.request_url(filter);
        let layer_name = source.layer_name(filter);
        self.load(&url, &layer_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DiskFeatureCache, NoOpCache};
    use crate::source::MockAsyncHttpClient;
    use tempfile::TempDir;

    const BODY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": null, "properties": {"vtj_prt": "A", "posno": "00100"}}
        ]
    }"#;

    fn disk_cache() -> (Arc<DiskFeatureCache>, TempDir) {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(DiskFeatureCache::new(temp.path().to_path_buf()).unwrap());
        (cache, temp)
    }

    #[tokio::test]
    async fn test_load_fetches_and_caches() {
        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(mock.clone(), cache.clone());

        let collection = loader.load("https://example.fi/wfs?posno=00100", "Buildings 00100").await;

        assert_eq!(collection.unwrap().len(), 1);
        assert_eq!(mock.request_count(), 1);
        assert!(cache.contains(&CacheKey::from_url("https://example.fi/wfs?posno=00100")));
    }

    #[tokio::test]
    async fn test_second_load_makes_no_network_call() {
        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(mock.clone(), cache);

        let first = loader.load("https://example.fi/wfs?posno=00100", "Buildings 00100").await;
        let second = loader.load("https://example.fi/wfs?posno=00100", "Buildings 00100").await;

        assert_eq!(first, second);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_urls_are_distinct_entries() {
        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(mock.clone(), cache);

        loader.load("https://example.fi/wfs?posno=00100", "Buildings 00100").await;
        loader.load("https://example.fi/wfs?posno=00120", "Buildings 00120").await;

        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_degrades_to_none() {
        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::failing("connection refused");
        let loader = FeatureLoader::new(mock.clone(), cache.clone());

        let result = loader.load("https://example.fi/wfs?posno=00100", "Buildings 00100").await;

        assert!(result.is_none());
        // Nothing cached on failure: the next attempt hits the network again.
        assert!(!cache.contains(&CacheKey::from_url("https://example.fi/wfs?posno=00100")));
    }

    #[tokio::test]
    async fn test_failure_then_success_retries_network() {
        let (cache, _temp) = disk_cache();

        let failing = MockAsyncHttpClient::failing("503 upstream");
        let loader = FeatureLoader::new(failing, cache.clone());
        assert!(loader.load("https://example.fi/wfs?posno=00100", "B").await.is_none());

        let working = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(working.clone(), cache);
        let result = loader.load("https://example.fi/wfs?posno=00100", "B").await;

        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(working.request_count(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_cached() {
        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::ok("<html>not geojson</html>");
        let loader = FeatureLoader::new(mock.clone(), cache.clone());

        let result = loader.load("https://example.fi/wfs", "Buildings").await;

        assert!(result.is_none());
        assert!(!cache.contains(&CacheKey::from_url("https://example.fi/wfs")));
    }

    #[tokio::test]
    async fn test_noop_cache_always_refetches() {
        let mock = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(mock.clone(), Arc::new(NoOpCache::new()));

        loader.load("https://example.fi/wfs", "B").await;
        loader.load("https://example.fi/wfs", "B").await;

        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_load_source_uses_request_url_and_layer_name() {
        use crate::source::{AnalyticsSource, Collection};

        let (cache, _temp) = disk_cache();
        let mock = MockAsyncHttpClient::ok(BODY);
        let loader = FeatureLoader::new(mock, cache);

        let source =
            AnalyticsSource::with_base_url("https://example.fi/r4c", Collection::HeatExposure)
                .unwrap();
        let filter = AreaFilter::PostalCode("00100".to_string());
        let collection = loader.load_source(&source, &filter).await.unwrap();

        assert_eq!(collection.layer_name, "HeatExposure 00100");
        assert!(collection.source_url.contains("/collections/heatexposure/items"));
    }
}
