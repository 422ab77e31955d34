//! Feature schema for the credit default model
//!
//! The schema is the single source of truth for which features a request must
//! carry, the inclusive bounds each value must respect, and the column order of
//! the vector handed to the model. The model was fitted on vectors in exactly
//! this order, so reordering entries requires retraining.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of features the model consumes
pub const FEATURE_COUNT: usize = 6;

/// One named input dimension with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FeatureSpec {
    /// Feature name as submitted by clients
    pub name: &'static str,

    /// Smallest accepted value (inclusive)
    pub min: f64,

    /// Largest accepted value (inclusive)
    pub max: f64,
}

impl FeatureSpec {
    const fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self { name, min, max }
    }

    /// Check whether a value lies within `[min, max]`
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Required features in model column order
pub const FEATURE_SCHEMA: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec::new("credit_lines_outstanding", 0.0, 100.0),
    FeatureSpec::new("loan_amt_outstanding", 0.0, 10_000_000.0),
    FeatureSpec::new("total_debt_outstanding", 0.0, 10_000_000.0),
    FeatureSpec::new("income", 0.0, 10_000_000.0),
    FeatureSpec::new("years_employed", 0.0, 100.0),
    FeatureSpec::new("fico_score", 300.0, 850.0),
];

/// Feature names in schema order
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|spec| spec.name)
}

/// Look up a feature's bounds by name
pub fn spec_for(name: &str) -> Option<&'static FeatureSpec> {
    FEATURE_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Serializes as `{name: {min, max}}` in schema order
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureLimits;

impl Serialize for FeatureLimits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Bounds {
            min: f64,
            max: f64,
        }

        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for spec in &FEATURE_SCHEMA {
            map.serialize_entry(
                spec.name,
                &Bounds {
                    min: spec.min,
                    max: spec.max,
                },
            )?;
        }
        map.end()
    }
}

/// A valid request body using each feature's minimum; serializes as `{name: min}`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamplePayload;

impl Serialize for ExamplePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for spec in &FEATURE_SCHEMA {
            map.serialize_entry(spec.name, &spec.min)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_ordered() {
        for spec in &FEATURE_SCHEMA {
            assert!(spec.min <= spec.max, "{} has min > max", spec.name);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = feature_names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_column_order() {
        let names: Vec<_> = feature_names().collect();
        assert_eq!(names.first(), Some(&"credit_lines_outstanding"));
        assert_eq!(names.last(), Some(&"fico_score"));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let fico = spec_for("fico_score").unwrap();
        assert!(fico.contains(300.0));
        assert!(fico.contains(850.0));
        assert!(!fico.contains(299.99));
        assert!(!fico.contains(850.01));
    }

    #[test]
    fn test_unknown_feature_lookup() {
        assert!(spec_for("age").is_none());
    }

    #[test]
    fn test_example_payload_uses_minimums() {
        let value = serde_json::to_value(ExamplePayload).unwrap();
        assert_eq!(value["fico_score"], 300.0);
        assert_eq!(value["income"], 0.0);
        assert_eq!(value.as_object().unwrap().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_limits_serialization() {
        let json = serde_json::to_string(&FeatureLimits).unwrap();
        assert!(json.starts_with(r#"{"credit_lines_outstanding":{"min":0.0,"max":100.0}"#));
        assert!(json.ends_with(r#""fico_score":{"min":300.0,"max":850.0}}"#));
    }
}
