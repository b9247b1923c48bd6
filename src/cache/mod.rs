//! Persistent feature cache keyed by request URL.
//!
//! Stores the raw GeoJSON text of fetched collections so repeated area
//! selections avoid redundant network calls. Entries carry their fetch
//! timestamp but the policy is explicitly never-expire: an entry lives
//! until [`FeatureCache::clear`] wipes the store.

mod disk;
mod stats;
mod r#trait;
mod types;

pub use disk::DiskFeatureCache;
pub use r#trait::{FeatureCache, NoOpCache};
pub use stats::CacheStats;
pub use types::{CacheConfig, CacheError, CacheKey};
