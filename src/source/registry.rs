//! Municipal building registry served over WFS.

use super::types::{AreaFilter, FeatureSource, SourceError};
use reqwest::Url;

/// Default GeoServer endpoint of the regional building registry.
pub const DEFAULT_WFS_URL: &str = "https://kartta.hsy.fi/geoserver/wfs";

/// Feature type holding the continuously-updated building stock.
const BUILDINGS_TYPENAME: &str = "asuminen_ja_maankaytto:pks_rakennukset_paivittyva";

/// Building registry source.
///
/// Builds WFS 2.0 GetFeature requests with a CQL postal-code filter, so
/// each postal-code area is one cacheable request. Responses are GeoJSON
/// in WGS84 regardless of the server's native projection.
#[derive(Debug)]
pub struct WfsBuildingSource {
    base_url: Url,
    typename: String,
}

impl WfsBuildingSource {
    /// Creates a source against the default registry endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_WFS_URL).expect("default WFS URL is valid")
    }

    /// Creates a source against a custom WFS endpoint.
    ///
    /// Useful for tests and for mirrors of the registry.
    pub fn with_base_url(base_url: &str) -> Result<Self, SourceError> {
        let url = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url: url,
            typename: BUILDINGS_TYPENAME.to_string(),
        })
    }

    /// Overrides the WFS feature type name.
    pub fn with_typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = typename.into();
        self
    }
}

impl Default for WfsBuildingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for WfsBuildingSource {
    fn name(&self) -> &str {
        "building registry"
    }

    fn layer_prefix(&self) -> &str {
        "Buildings"
    }

    fn request_url(&self, filter: &AreaFilter) -> String {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("service", "WFS")
                .append_pair("request", "GetFeature")
                .append_pair("version", "2.0.0")
                .append_pair("typename", &self.typename)
                .append_pair("outputFormat", "application/json")
                .append_pair("srsName", "EPSG:4326");
            if let Some(code) = filter.postal_code() {
                pairs.append_pair("CQL_FILTER", &format!("posno = '{}'", code));
            }
        }
        url.into()
    }
}
