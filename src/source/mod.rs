//! Remote feature sources.
//!
//! Each source owns a base URL and knows how to build the GetFeature /
//! items request for an area filter. Sources never fetch by themselves;
//! the [`crate::loader`] resolves the URL through the cache and the
//! shared HTTP client, so a source is just the addressing scheme of one
//! upstream system.

mod analytics;
mod http;
mod registry;
mod types;

pub use analytics::{AnalyticsSource, Collection, DEFAULT_ANALYTICS_URL};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use registry::{WfsBuildingSource, DEFAULT_WFS_URL};
pub use types::{AreaFilter, FeatureSource, SourceError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
