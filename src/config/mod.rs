//! Application configuration.
//!
//! Pure data types with defaults; the explorer is configured in code by
//! its embedder rather than from a config file, so there is no parsing
//! layer here.

mod settings;

pub use settings::{
    CacheSettings, DownloadSettings, LoggingSettings, Settings, SourceSettings,
};
