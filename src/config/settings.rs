//! Settings structs for all configuration sections.
//!
//! Each struct covers one concern and carries its own defaults, so an
//! embedder only overrides the fields it cares about.

use crate::cache::CacheConfig;
use crate::source::{DEFAULT_ANALYTICS_URL, DEFAULT_WFS_URL};
use std::path::PathBuf;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Default log file name, placed in the logging directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "heatatlas.log";

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Remote source endpoints
    pub sources: SourceSettings,
    /// Persistent feature cache
    pub cache: CacheSettings,
    /// HTTP download behaviour
    pub download: DownloadSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// Remote source endpoints.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Base URL of the municipal WFS serving building footprints
    pub wfs_base_url: String,
    /// Base URL of the analytics API serving heat, vegetation and sensors
    pub analytics_base_url: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            wfs_base_url: DEFAULT_WFS_URL.to_string(),
            analytics_base_url: DEFAULT_ANALYTICS_URL.to_string(),
        }
    }
}

/// Persistent cache configuration.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Cache directory path
    pub directory: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: CacheConfig::default().cache_dir,
        }
    }
}

/// Download configuration.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Directory the log file is written to; `None` disables file output
    pub directory: Option<PathBuf>,
    /// Log file name inside the directory
    pub file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_LOG_FILE_NAME.to_string(),
        }
    }
}
