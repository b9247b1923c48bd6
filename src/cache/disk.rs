//! Disk-backed feature cache with a startup index scan.

use crate::cache::stats::CacheStats;
use crate::cache::types::{CacheError, CacheKey};
use crate::cache::FeatureCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// On-disk envelope for one cache entry.
///
/// The envelope records the full request URL (filenames are digests, not
/// reversible) and the fetch timestamp. The timestamp is informational:
/// the stated policy is that entries never expire.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    /// Request URL this entry was fetched from
    url: String,
    /// Unix seconds when the body was fetched
    fetched_at: u64,
    /// Raw GeoJSON text of the collection
    body: String,
}

/// Persistent cache storing one JSON envelope file per request URL.
///
/// The index maps keys to paths and is rebuilt by scanning the cache
/// directory on startup, so entries survive across sessions. Writes
/// replace the whole entry file; a key is never partially overwritten.
pub struct DiskFeatureCache {
    cache_dir: PathBuf,
    index: Mutex<HashMap<CacheKey, PathBuf>>,
    stats: Mutex<CacheStats>,
}

impl DiskFeatureCache {
    /// Opens (or creates) a cache rooted at the given directory and scans
    /// existing entries into the index.
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }

        let cache = Self {
            cache_dir,
            index: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::new()),
        };
        cache.scan_cache_dir()?;
        Ok(cache)
    }

    /// Number of entries currently indexed.
    pub fn entry_count(&self) -> usize {
        self.index.lock().map(|index| index.len()).unwrap_or(0)
    }

    /// Fetch timestamp of an entry, if present.
    pub fn fetched_at(&self, key: &CacheKey) -> Option<SystemTime> {
        let path = {
            let index = self.index.lock().ok()?;
            index.get(key).cloned()?
        };
        let envelope = read_envelope(&path)?;
        Some(UNIX_EPOCH + std::time::Duration::from_secs(envelope.fetched_at))
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.file_stem()))
    }

    /// Rebuilds the index by reading every envelope in the directory.
    ///
    /// Files that fail to parse are skipped with a warning; they will be
    /// replaced on the next write of their key.
    fn scan_cache_dir(&self) -> Result<(), CacheError> {
        let mut total_size = 0usize;
        let mut index = self.index.lock().map_err(|_| {
            CacheError::InvalidConfig("cache index lock poisoned".to_string())
        })?;

        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_envelope(&path) {
                Some(envelope) => {
                    total_size += envelope.body.len();
                    index.insert(CacheKey::from_url(envelope.url), path);
                }
                None => {
                    warn!(path = %path.display(), "skipping unreadable cache entry");
                }
            }
        }

        let entry_count = index.len();
        drop(index);

        if let Ok(mut stats) = self.stats.lock() {
            stats.update_size(total_size, entry_count);
        }
        debug!(entries = entry_count, bytes = total_size, "cache index scanned");

        Ok(())
    }
}

fn read_envelope(path: &Path) -> Option<Envelope> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

impl FeatureCache for DiskFeatureCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        let path = {
            let index = self.index.lock().ok()?;
            index.get(key).cloned()
        };

        if let Some(path) = path {
            if let Some(envelope) = read_envelope(&path) {
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_hit();
                }
                return Some(envelope.body);
            }
            // Unreadable entry: drop it from the index so the next load
            // refetches and rewrites it.
            if let Ok(mut index) = self.index.lock() {
                index.remove(key);
            }
        }

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_miss();
        }
        None
    }

    fn put(&self, key: CacheKey, body: String) -> Result<(), CacheError> {
        let path = self.entry_path(&key);

        // Whole-value replacement: the outgoing entry's size must come
        // off the running total before the new size goes on.
        let replaced_bytes = {
            let index = self.index.lock().map_err(|_| {
                CacheError::InvalidConfig("cache index lock poisoned".to_string())
            })?;
            index
                .get(&key)
                .and_then(|existing| read_envelope(existing))
                .map(|envelope| envelope.body.len())
                .unwrap_or(0)
        };
        let fetched_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let envelope = Envelope {
            url: key.as_str().to_string(),
            fetched_at,
            body,
        };

        let encoded = serde_json::to_string(&envelope)?;
        let result = fs::write(&path, &encoded);

        if let Err(err) = result {
            if let Ok(mut stats) = self.stats.lock() {
                stats.record_write_failure();
            }
            return Err(CacheError::Io(err));
        }

        let entry_count = {
            let mut index = self.index.lock().map_err(|_| {
                CacheError::InvalidConfig("cache index lock poisoned".to_string())
            })?;
            index.insert(key, path);
            index.len()
        };

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_write();
            stats.entry_count = entry_count;
            stats.size_bytes = stats.size_bytes - replaced_bytes + envelope.body.len();
        }

        Ok(())
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.index
            .lock()
            .map(|index| index.contains_key(key))
            .unwrap_or(false)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut index = self.index.lock().map_err(|_| {
            CacheError::InvalidConfig("cache index lock poisoned".to_string())
        })?;

        for path in index.values() {
            let _ = fs::remove_file(path);
        }
        index.clear();
        drop(index);

        if let Ok(mut stats) = self.stats.lock() {
            stats.update_size(0, 0);
        }

        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }
}
