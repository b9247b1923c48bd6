//! Heat-exposure analytics API and its sibling collections.
//!
//! The analytics service is an OGC API Features ("items") endpoint that
//! publishes per-building heat exposure, vegetation (NDVI) polygons and
//! the urban sensor feed, each as its own collection filterable by
//! postal code.

use super::types::{AreaFilter, FeatureSource, SourceError};
use reqwest::Url;

/// Default base URL of the analytics API.
pub const DEFAULT_ANALYTICS_URL: &str = "https://geo.fvh.fi/r4c";

/// Upper bound on features per request; areas stay well below this.
const ITEM_LIMIT: u32 = 10_000;

/// One collection published by the analytics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Per-building heat exposure indices, joinable to the registry
    HeatExposure,
    /// Vegetation polygons derived from NDVI rasters
    Vegetation,
    /// Live urban sensor observations (points)
    Sensors,
    /// Postal-code area boundaries with socio-economic attributes
    PostalAreas,
}

impl Collection {
    /// Collection identifier in the API path.
    fn path_id(self) -> &'static str {
        match self {
            Collection::HeatExposure => "heatexposure",
            Collection::Vegetation => "ndvi",
            Collection::Sensors => "urban_sensors",
            Collection::PostalAreas => "postal_code_areas",
        }
    }

    /// Display layer prefix for this collection.
    fn layer_prefix(self) -> &'static str {
        match self {
            Collection::HeatExposure => "HeatExposure",
            Collection::Vegetation => "Vegetation",
            Collection::Sensors => "Sensors",
            Collection::PostalAreas => "PostalAreas",
        }
    }

    /// Source name for logging.
    fn source_name(self) -> &'static str {
        match self {
            Collection::HeatExposure => "heat exposure analytics",
            Collection::Vegetation => "vegetation analytics",
            Collection::Sensors => "urban sensors",
            Collection::PostalAreas => "postal-code boundaries",
        }
    }
}

/// Source for one analytics API collection.
#[derive(Debug)]
pub struct AnalyticsSource {
    base_url: Url,
    collection: Collection,
}

impl AnalyticsSource {
    /// Creates a source for a collection on the default endpoint.
    pub fn new(collection: Collection) -> Self {
        Self::with_base_url(DEFAULT_ANALYTICS_URL, collection)
            .expect("default analytics URL is valid")
    }

    /// Creates a source for a collection on a custom endpoint.
    pub fn with_base_url(base_url: &str, collection: Collection) -> Result<Self, SourceError> {
        let url = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        // Collection paths are appended per request, so the base must be
        // able to carry path segments (rules out mailto: and friends).
        if url.cannot_be_a_base() {
            return Err(SourceError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot serve as a base for collection paths".to_string(),
            });
        }

        Ok(Self {
            base_url: url,
            collection,
        })
    }

    /// The collection this source addresses.
    pub fn collection(&self) -> Collection {
        self.collection
    }
}

impl FeatureSource for AnalyticsSource {
    fn name(&self) -> &str {
        self.collection.source_name()
    }

    fn layer_prefix(&self) -> &str {
        self.collection.layer_prefix()
    }

    fn request_url(&self, filter: &AreaFilter) -> String {
        let mut url = self.base_url.clone();
        {
            // Url::join would drop the base path, so extend segments instead.
            // with_base_url rejects cannot-be-a-base URLs.
            let mut segments = url
                .path_segments_mut()
                .expect("base URL validated at construction");
            segments.pop_if_empty();
            segments.extend(["collections", self.collection.path_id(), "items"]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("f", "json")
                .append_pair("limit", &ITEM_LIMIT.to_string());
            if let Some(code) = filter.postal_code() {
                pairs.append_pair("posno", code);
            }
        }
        url.into()
    }
}
