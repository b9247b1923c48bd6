//! Feature and feature-collection data model.
//!
//! A [`Feature`] is a geometry plus a mapping of attribute name to value,
//! produced by parsing a GeoJSON FeatureCollection body. Features are
//! immutable once parsed except for attribute enrichment performed by the
//! correlation pass (see [`crate::correlate`]).

mod geojson;
mod model;

pub use geojson::{parse_collection, to_json};
pub use model::{AttributeValue, Feature, FeatureCollection, Geometry};

use thiserror::Error;

/// Errors raised while decoding or encoding feature collections.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The body was not valid JSON or did not match the GeoJSON shape
    #[error("GeoJSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The body parsed as JSON but its `type` was not `FeatureCollection`
    #[error("expected a FeatureCollection, found type {0:?}")]
    NotACollection(String),
}
