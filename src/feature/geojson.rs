//! GeoJSON FeatureCollection codec.
//!
//! Every remote source speaks GeoJSON, and the cache stores the raw body
//! text, so this codec runs both on fresh responses and on cache reads.

use super::model::{AttributeValue, Feature, FeatureCollection, Geometry};
use super::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire shape of a GeoJSON feature.
#[derive(Debug, Serialize, Deserialize)]
struct WireFeature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<BTreeMap<String, AttributeValue>>,
}

/// Wire shape of a GeoJSON feature collection.
#[derive(Debug, Serialize, Deserialize)]
struct WireCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<WireFeature>,
}

/// Parses a GeoJSON body into a [`FeatureCollection`].
///
/// `layer_name` and `source_url` become the collection's source metadata.
/// Bodies whose top-level `type` is not `FeatureCollection` are rejected;
/// features with a missing or null `properties` member parse as
/// attribute-less features rather than errors.
pub fn parse_collection(
    body: &str,
    layer_name: &str,
    source_url: &str,
) -> Result<FeatureCollection, FeatureError> {
    let wire: WireCollection = serde_json::from_str(body)?;

    if wire.kind != "FeatureCollection" {
        return Err(FeatureError::NotACollection(wire.kind));
    }

    let mut collection = FeatureCollection::new(layer_name, source_url);
    for feature in wire.features {
        collection.push(Feature {
            geometry: feature.geometry,
            properties: feature.properties.unwrap_or_default(),
        });
    }

    Ok(collection)
}

/// Serializes a collection back to GeoJSON text.
///
/// Used when a correlated collection is written into the cache in place
/// of the raw source body.
pub fn to_json(collection: &FeatureCollection) -> Result<String, FeatureError> {
    let wire = WireCollection {
        kind: "FeatureCollection".to_string(),
        features: collection
            .features
            .iter()
            .map(|f| WireFeature {
                kind: "Feature".to_string(),
                geometry: f.geometry.clone(),
                properties: Some(f.properties.clone()),
            })
            .collect(),
    };

    Ok(serde_json::to_string(&wire)?)
}
