//! Core types for the feature cache.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

/// Cache key identifying one cached feature collection.
///
/// The key is the fully-qualified request URL: two requests differing in
/// any query parameter (postal code, output format) are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from a request URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The request URL this key represents.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable on-disk file stem for this key.
    ///
    /// URLs are not filesystem-safe, so the stem is a truncated SHA-256
    /// digest of the URL. The full URL is recorded inside the entry
    /// envelope, which is what the startup scan trusts when it rebuilds
    /// the index.
    pub fn file_stem(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut stem = String::with_capacity(32);
        for byte in digest.iter().take(16) {
            stem.push_str(&format!("{:02x}", byte));
        }
        stem
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry envelope could not be encoded or decoded
    #[error("cache entry encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Invalid cache configuration
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Disk cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding one file per cached entry
    pub cache_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("heatatlas");

        Self { cache_dir }
    }
}

impl CacheConfig {
    /// Creates a configuration rooted at the given directory.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }
}
