//! Source types and traits.

use thiserror::Error;

/// Errors that can occur while talking to a remote feature source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// HTTP request failed (connect, timeout or non-2xx status)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not usable (bad encoding, wrong shape)
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The base URL in configuration could not be parsed
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Spatial filter applied to a source request.
///
/// The drill-down hierarchy only ever filters by postal code; the
/// region-wide variant is used for the top-level boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaFilter {
    /// No filter: the whole capital region
    Region,
    /// One postal-code area, e.g. `"00100"`
    PostalCode(String),
}

impl AreaFilter {
    /// The postal code, if this filter names one.
    pub fn postal_code(&self) -> Option<&str> {
        match self {
            AreaFilter::Region => None,
            AreaFilter::PostalCode(code) => Some(code),
        }
    }
}

/// A remote system that serves GeoJSON feature collections.
///
/// Implementors define the request URL for an area filter and the name
/// of the display layer their collections land in. Fetching and caching
/// are the loader's concern, which keeps this trait object safe.
pub trait FeatureSource: Send + Sync {
    /// Source name for logging and identification.
    fn name(&self) -> &str;

    /// Prefix of the display layer this source feeds. The postal code is
    /// appended for per-area layers, so `"Buildings"` becomes
    /// `"Buildings 00100"`.
    fn layer_prefix(&self) -> &str;

    /// Builds the fully-qualified request URL for the filter. This URL
    /// is also the persistent cache key for the response.
    fn request_url(&self, filter: &AreaFilter) -> String;

    /// Display layer name for the filter.
    fn layer_name(&self, filter: &AreaFilter) -> String {
        match filter.postal_code() {
            Some(code) => format!("{} {}", self.layer_prefix(), code),
            None => self.layer_prefix().to_string(),
        }
    }
}
