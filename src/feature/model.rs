//! Core feature types shared by every pipeline stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value on a feature.
///
/// GeoJSON properties carry strings, numbers, booleans and nulls; all four
/// are preserved verbatim. Nested objects and arrays do not occur in the
/// sources this core reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Explicit null (distinct from an absent attribute)
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value (GeoJSON has only one number type)
    Number(f64),
    /// Free-form text
    Text(String),
}

impl AttributeValue {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Canonical textual form used when comparing join-key values.
    ///
    /// Identifier fields arrive as strings from one source and numbers
    /// from another; whole numbers are rendered without a fraction so
    /// `"1234"` and `1234.0` compare equal. Nulls and booleans never
    /// participate in a join.
    pub fn join_key(&self) -> Option<String> {
        match self {
            AttributeValue::Null | AttributeValue::Bool(_) => None,
            AttributeValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            AttributeValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Feature geometry.
///
/// The core treats coordinates as opaque beyond their structure; no
/// geometry math happens in this crate. Rendering collaborators turn
/// these into visual primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position `[lon, lat]` (sensors)
    Point { coordinates: Vec<f64> },
    /// Rings of positions (postal-code areas, building footprints)
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    /// Several polygons (fragmented postal-code areas)
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

/// A single geospatial record: geometry plus named attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry, absent for attribute-only records
    pub geometry: Option<Geometry>,
    /// Attribute name to value, in deterministic order
    pub properties: BTreeMap<String, AttributeValue>,
}

impl Feature {
    /// Creates a feature with the given geometry and no attributes.
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            geometry,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter, used heavily in tests.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.properties.get(name)
    }

    /// Sets (or replaces) an attribute. This is the enrichment mutator
    /// used by the correlation pass.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.properties.insert(name.into(), value);
    }

    /// Returns true if the attribute is present, even as an explicit null.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns the attribute as a finite number, treating absent, null
    /// and non-numeric values alike.
    pub fn numeric_attribute(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(AttributeValue::as_f64)
    }
}

/// An ordered sequence of features from one source.
///
/// Owned by the layer that loaded it for its lifetime and destroyed when
/// the layer is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    /// Display layer this collection belongs to
    pub layer_name: String,
    /// Fully-qualified request URL the collection was fetched from
    pub source_url: String,
    /// Features in source order
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Creates an empty collection with source metadata.
    pub fn new(layer_name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            layer_name: layer_name.into(),
            source_url: source_url.into(),
            features: Vec::new(),
        }
    }

    /// Appends a feature, preserving order.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Number of features in the collection.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the collection holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
