//! Feature correlation across sources.
//!
//! The building registry and the heat-exposure analytics API describe the
//! same buildings under different identifier fields. Correlation joins
//! the two collections by that shared municipal identifier, copies a
//! whitelist of enrichment attributes onto each matched registry feature,
//! and appends any analytics record that found no registry counterpart so
//! nothing from the secondary source is silently dropped.

use crate::feature::{Feature, FeatureCollection};
use tracing::debug;

/// Describes how two collections join.
///
/// `primary_key` names the identifier attribute on the primary (registry)
/// side, `secondary_key` the one on the secondary (analytics) side, and
/// `enrichment` the attributes copied from a matched secondary feature.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    /// Identifier attribute on primary features
    pub primary_key: String,
    /// Identifier attribute on secondary features
    pub secondary_key: String,
    /// Attributes copied from a matched secondary feature
    pub enrichment: Vec<String>,
}

impl JoinSpec {
    /// Creates a spec with an empty enrichment whitelist.
    pub fn new(primary_key: impl Into<String>, secondary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            secondary_key: secondary_key.into(),
            enrichment: Vec::new(),
        }
    }

    /// Builder-style whitelist setter.
    pub fn with_enrichment(mut self, attributes: &[&str]) -> Self {
        self.enrichment = attributes.iter().map(|a| a.to_string()).collect();
        self
    }

    /// The join used between the building registry and the heat API:
    /// registry `vtj_prt` against analytics `hki_id`, enriching with the
    /// heat index plus the descriptive registry fields the analytics side
    /// carries for buildings the registry lacks.
    pub fn building_heat() -> Self {
        Self::new("vtj_prt", "hki_id").with_enrichment(&[
            "avgheatexposure",
            "kavu",
            "julkisivu_s",
            "kerrosten_lkm",
        ])
    }
}

/// Joins `secondary` onto `primary` according to `spec`.
///
/// For each primary feature the secondary collection is scanned linearly;
/// the first secondary whose `secondary_key` equals the primary's
/// `primary_key` wins and is consumed, so each secondary record merges at
/// most once. Features with an absent or null identifier on either side
/// never match - that is not an error. Unmatched secondary features are
/// appended to the output as standalone features after all primaries.
///
/// The output carries the primary collection's source metadata; primary
/// feature order is preserved, with appended secondaries in their own
/// source order at the tail.
pub fn correlate(
    primary: &FeatureCollection,
    secondary: &FeatureCollection,
    spec: &JoinSpec,
) -> FeatureCollection {
    // Scratch list of not-yet-consumed secondaries. Matching removes from
    // this list rather than mutating the collection under iteration.
    let mut remaining: Vec<Feature> = secondary.features.clone();

    let mut output = FeatureCollection::new(primary.layer_name.clone(), primary.source_url.clone());
    let mut merged_count = 0usize;

    for feature in &primary.features {
        let mut merged = feature.clone();

        if let Some(id) = join_value(feature, &spec.primary_key) {
            let position = remaining
                .iter()
                .position(|candidate| join_value(candidate, &spec.secondary_key).as_deref() == Some(&id));

            if let Some(position) = position {
                let matched = remaining.remove(position);
                for attribute in &spec.enrichment {
                    if let Some(value) = matched.attribute(attribute) {
                        merged.set_attribute(attribute.clone(), value.clone());
                    }
                }
                merged_count += 1;
            }
        }

        output.push(merged);
    }

    let appended = remaining.len();
    for leftover in remaining {
        output.push(leftover);
    }

    debug!(
        primary = primary.len(),
        merged = merged_count,
        appended = appended,
        "collections correlated"
    );

    output
}

/// Normalized join-key value of a feature, if it has one.
fn join_value(feature: &Feature, key: &str) -> Option<String> {
    feature.attribute(key).and_then(|value| value.join_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::AttributeValue;

    fn collection(layer: &str, features: Vec<Feature>) -> FeatureCollection {
        let mut c = FeatureCollection::new(layer, format!("http://example.fi/{}", layer));
        for f in features {
            c.push(f);
        }
        c
    }

    fn building(id: &str) -> Feature {
        Feature::new(None).with_attribute("vtj_prt", id)
    }

    fn heat_record(id: &str, heat: f64) -> Feature {
        Feature::new(None)
            .with_attribute("hki_id", id)
            .with_attribute("avgheatexposure", heat)
    }

    fn heat_spec() -> JoinSpec {
        JoinSpec::new("vtj_prt", "hki_id").with_enrichment(&["avgheatexposure"])
    }

    #[test]
    fn test_match_copies_enrichment_and_consumes_secondary() {
        // Buildings B1, B2 against a single heat record for B1: B1 gains
        // the heat value, B2 is untouched, and no third record appears.
        let primary = collection("Buildings", vec![building("B1"), building("B2")]);
        let secondary = collection("Heat", vec![heat_record("B1", 0.7)]);

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 2);
        assert_eq!(result.features[0].numeric_attribute("avgheatexposure"), Some(0.7));
        assert!(!result.features[1].has_attribute("avgheatexposure"));
    }

    #[test]
    fn test_unmatched_secondary_is_appended() {
        let primary = collection("Buildings", vec![building("B1")]);
        let secondary = collection(
            "Heat",
            vec![heat_record("B1", 0.4), heat_record("B9", 0.9)],
        );

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 2);
        assert_eq!(result.features[0].numeric_attribute("avgheatexposure"), Some(0.4));
        // The analytics-only building surfaces as a standalone feature.
        assert_eq!(
            result.features[1].attribute("hki_id").and_then(|v| v.as_str()),
            Some("B9")
        );
    }

    #[test]
    fn test_every_secondary_appears_exactly_once() {
        let primary = collection(
            "Buildings",
            vec![building("B1"), building("B2"), building("B3")],
        );
        let secondary = collection(
            "Heat",
            vec![
                heat_record("B2", 0.2),
                heat_record("B7", 0.7),
                heat_record("B1", 0.1),
            ],
        );

        let result = correlate(&primary, &secondary, &heat_spec());

        // 3 primaries + 1 appended secondary; 2 merged.
        assert_eq!(result.len(), 4);
        let merged: usize = result
            .features
            .iter()
            .filter(|f| f.has_attribute("avgheatexposure"))
            .count();
        assert_eq!(merged, 3); // B1, B2 merged; B7 appended with its own attrs
    }

    #[test]
    fn test_first_match_wins_and_secondary_merges_once() {
        // Two primaries share an identifier; only the first receives the
        // single matching secondary record.
        let primary = collection("Buildings", vec![building("B1"), building("B1")]);
        let secondary = collection("Heat", vec![heat_record("B1", 0.5)]);

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 2);
        assert_eq!(result.features[0].numeric_attribute("avgheatexposure"), Some(0.5));
        assert!(!result.features[1].has_attribute("avgheatexposure"));
    }

    #[test]
    fn test_duplicate_secondaries_each_consumed_once() {
        let primary = collection("Buildings", vec![building("B1"), building("B1")]);
        let secondary = collection(
            "Heat",
            vec![heat_record("B1", 0.5), heat_record("B1", 0.6)],
        );

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 2);
        assert_eq!(result.features[0].numeric_attribute("avgheatexposure"), Some(0.5));
        assert_eq!(result.features[1].numeric_attribute("avgheatexposure"), Some(0.6));
    }

    #[test]
    fn test_missing_or_null_key_never_matches() {
        let primary = collection(
            "Buildings",
            vec![
                Feature::new(None), // no identifier at all
                Feature::new(None).with_attribute("vtj_prt", AttributeValue::Null),
            ],
        );
        let secondary = collection("Heat", vec![heat_record("B1", 0.7)]);

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 3); // both primaries plus appended secondary
        assert!(!result.features[0].has_attribute("avgheatexposure"));
        assert!(!result.features[1].has_attribute("avgheatexposure"));
    }

    #[test]
    fn test_numeric_and_text_identifiers_join() {
        let primary = collection(
            "Buildings",
            vec![Feature::new(None).with_attribute("vtj_prt", 1234_i64)],
        );
        let secondary = collection("Heat", vec![heat_record("1234", 0.3)]);

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.len(), 1);
        assert_eq!(result.features[0].numeric_attribute("avgheatexposure"), Some(0.3));
    }

    #[test]
    fn test_only_whitelisted_attributes_are_copied() {
        let primary = collection("Buildings", vec![building("B1")]);
        let secondary = collection(
            "Heat",
            vec![heat_record("B1", 0.7).with_attribute("internal_flag", true)],
        );

        let result = correlate(&primary, &secondary, &heat_spec());

        assert!(result.features[0].has_attribute("avgheatexposure"));
        assert!(!result.features[0].has_attribute("internal_flag"));
    }

    #[test]
    fn test_output_keeps_primary_metadata_and_order() {
        let primary = collection("Buildings", vec![building("B2"), building("B1")]);
        let secondary = collection("Heat", vec![heat_record("B1", 0.1)]);

        let result = correlate(&primary, &secondary, &heat_spec());

        assert_eq!(result.layer_name, "Buildings");
        assert_eq!(result.source_url, "http://example.fi/Buildings");
        let ids: Vec<_> = result
            .features
            .iter()
            .filter_map(|f| f.attribute("vtj_prt").and_then(|v| v.as_str().map(String::from)))
            .collect();
        assert_eq!(ids, vec!["B2", "B1"]);
    }

    #[test]
    fn test_empty_collections() {
        let empty_primary = collection("Buildings", vec![]);
        let secondary = collection("Heat", vec![heat_record("B1", 0.7)]);

        let result = correlate(&empty_primary, &secondary, &heat_spec());
        assert_eq!(result.len(), 1); // lone appended secondary

        let empty_secondary = collection("Heat", vec![]);
        let primary = collection("Buildings", vec![building("B1")]);
        let result = correlate(&primary, &empty_secondary, &heat_spec());
        assert_eq!(result.len(), 1);
        assert!(!result.features[0].has_attribute("avgheatexposure"));
    }

    #[test]
    fn test_building_heat_spec_defaults() {
        let spec = JoinSpec::building_heat();
        assert_eq!(spec.primary_key, "vtj_prt");
        assert_eq!(spec.secondary_key, "hki_id");
        assert!(spec.enrichment.contains(&"avgheatexposure".to_string()));
    }
}
