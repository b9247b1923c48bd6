//! Cache statistics tracking.

use std::time::Instant;

/// Counters for cache monitoring and diagnostics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Reads served from disk
    pub hits: u64,
    /// Reads that fell through to the network
    pub misses: u64,
    /// Successful entry writes
    pub writes: u64,
    /// Entry writes that failed (logged, not fatal)
    pub write_failures: u64,
    /// Entries currently indexed
    pub entry_count: usize,
    /// Total bytes of cached bodies
    pub size_bytes: usize,
    /// When this tracker was created
    pub created_at: Instant,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    /// Creates a zeroed statistics tracker.
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            writes: 0,
            write_failures: 0,
            entry_count: 0,
            size_bytes: 0,
            created_at: Instant::now(),
        }
    }

    /// Records a read served from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a read that missed.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a successful write.
    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    /// Records a failed write.
    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    /// Updates the size snapshot after a write, scan or clear.
    pub fn update_size(&mut self, size_bytes: usize, entry_count: usize) {
        self.size_bytes = size_bytes;
        self.entry_count = entry_count;
    }

    /// Hit rate over all reads, 0.0 to 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
