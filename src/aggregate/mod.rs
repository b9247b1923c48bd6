//! Aggregate statistics over correlated collections.
//!
//! Chart and table collaborators consume these values directly: the mean
//! drives the area headline number, the raw value array feeds the
//! histogram, and the ranked dimension triples drive the vulnerability
//! bar chart. Results are recomputed in full on every relevant data
//! change - nothing here is incremental.

use crate::feature::Feature;

/// Scalar and distribution summary of one numeric attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSummary {
    /// Exact mean of the qualifying values, `None` when no feature
    /// qualifies. Callers decide whether to render anything for `None`.
    pub mean: Option<f64>,
    /// Raw qualifying values in feature order, for histogram consumers.
    pub values: Vec<f64>,
}

impl AggregateSummary {
    /// Number of qualifying features.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// True when no feature carried the attribute.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Summarizes one numeric attribute over a set of features.
///
/// Features missing the attribute, carrying a null, or carrying a
/// non-numeric value are filtered out rather than erroring. An empty
/// qualifying set yields `mean: None` - never a panic or a NaN.
pub fn summarize(features: &[Feature], attribute: &str) -> AggregateSummary {
    let values: Vec<f64> = features
        .iter()
        .filter_map(|feature| feature.numeric_attribute(attribute))
        .collect();

    let mean = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    AggregateSummary { mean, values }
}

/// One labelled rank for the vulnerability bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDimension {
    /// Display label of the dimension (e.g. an age-group name)
    pub label: String,
    /// Rank value as published, normalized 0..1
    pub rank: f64,
    /// Complement of the rank; charts show both sides of the bar
    pub inverse_rank: f64,
}

/// Builds ranked dimension triples from labelled rank values.
///
/// Input order is preserved deliberately: the displayed order, not the
/// rank value, determines chart layout, so no sorting happens here.
pub fn rank_dimensions(pairs: &[(String, f64)]) -> Vec<RankedDimension> {
    pairs
        .iter()
        .map(|(label, rank)| RankedDimension {
            label: label.clone(),
            rank: *rank,
            inverse_rank: 1.0 - rank,
        })
        .collect()
}
