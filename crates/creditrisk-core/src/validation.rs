//! Request validation against the feature schema
//!
//! Raw request bodies stay untyped (`serde_json::Value`) until they pass
//! through [`validate`]; everything downstream works with a [`FeatureVector`].

use crate::schema::{FeatureSpec, FEATURE_COUNT, FEATURE_SCHEMA};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Reasons a submitted record is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// No record was supplied
    #[error("no data was provided")]
    EmptyInput,

    /// The record is not a JSON object
    #[error("malformed request body: {reason}")]
    MalformedBody { reason: String },

    /// One or more required features are absent (all of them are listed)
    #[error("missing features: {}", names.join(", "))]
    MissingFeatures { names: Vec<&'static str> },

    /// Value cannot be read as a finite real number
    #[error("invalid value for {feature}: {reason}")]
    InvalidValue {
        feature: &'static str,
        reason: String,
    },

    /// Value lies outside the feature's declared bounds
    #[error("value {value} for {feature} is out of range (min: {min}, max: {max})")]
    OutOfRange {
        feature: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    fn invalid(feature: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            feature,
            reason: reason.into(),
        }
    }
}

/// Six finite values, in schema order, each within its bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Values in model column order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_SCHEMA
            .iter()
            .position(|spec| spec.name == name)
            .map(|idx| self.0[idx])
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_SCHEMA
            .iter()
            .zip(self.0.iter())
            .map(|(spec, value)| (spec.name, *value))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Validate a raw record and build the model input vector.
///
/// Missing features are reported all at once; per-feature checks stop at the
/// first failing feature in schema order.
pub fn validate(record: Option<&Value>) -> Result<FeatureVector, ValidationError> {
    let fields = match record {
        None | Some(Value::Null) => return Err(ValidationError::EmptyInput),
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            return Err(ValidationError::MalformedBody {
                reason: format!("expected a JSON object, got {}", json_kind(other)),
            })
        }
    };

    let missing: Vec<&'static str> = FEATURE_SCHEMA
        .iter()
        .filter(|spec| !fields.contains_key(spec.name))
        .map(|spec| spec.name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFeatures { names: missing });
    }

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, spec) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
        let value = coerce(spec.name, &fields[spec.name])?;
        check_bounds(spec, value)?;
        *slot = value;
    }

    Ok(FeatureVector(values))
}

fn coerce(feature: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::invalid(feature, format!("{} is not a real number", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::invalid(feature, format!("'{}' is not a number", s)))?,
        other => {
            return Err(ValidationError::invalid(
                feature,
                format!("expected a number, got {}", json_kind(other)),
            ))
        }
    };

    if !number.is_finite() {
        return Err(ValidationError::invalid(feature, "value is not a finite number"));
    }
    Ok(number)
}

fn check_bounds(spec: &FeatureSpec, value: f64) -> Result<(), ValidationError> {
    if spec.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            feature: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "credit_lines_outstanding": 5,
            "loan_amt_outstanding": 1000,
            "total_debt_outstanding": 2000,
            "income": 50000,
            "years_employed": 3,
            "fico_score": 700
        })
    }

    #[test]
    fn test_valid_record_in_schema_order() {
        let vector = validate(Some(&valid_record())).unwrap();
        assert_eq!(
            vector.as_slice(),
            &[5.0, 1000.0, 2000.0, 50000.0, 3.0, 700.0]
        );
        assert_eq!(vector.get("income"), Some(50000.0));
        assert_eq!(vector.get("unknown"), None);
    }

    #[test]
    fn test_absent_and_null_records_are_empty() {
        assert_eq!(validate(None), Err(ValidationError::EmptyInput));
        assert_eq!(validate(Some(&Value::Null)), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_empty_object_reports_every_feature() {
        let err = validate(Some(&json!({}))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFeatures {
                names: vec![
                    "credit_lines_outstanding",
                    "loan_amt_outstanding",
                    "total_debt_outstanding",
                    "income",
                    "years_employed",
                    "fico_score",
                ]
            }
        );
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err = validate(Some(&json!([1, 2, 3]))).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedBody { .. }));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut record = valid_record();
        record["fico_score"] = json!(" 720 ");
        record["income"] = json!("5e4");
        let vector = validate(Some(&record)).unwrap();
        assert_eq!(vector.get("fico_score"), Some(720.0));
        assert_eq!(vector.get("income"), Some(50000.0));
    }

    #[test]
    fn test_non_numeric_text_is_invalid() {
        let mut record = valid_record();
        record["income"] = json!("lots");
        match validate(Some(&record)) {
            Err(ValidationError::InvalidValue { feature, .. }) => assert_eq!(feature, "income"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_strings_are_invalid() {
        for text in ["nan", "inf", "-Infinity"] {
            let mut record = valid_record();
            record["years_employed"] = json!(text);
            assert!(
                matches!(
                    validate(Some(&record)),
                    Err(ValidationError::InvalidValue { feature: "years_employed", .. })
                ),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_booleans_and_null_values_are_invalid() {
        for value in [json!(true), Value::Null, json!([700]), json!({"v": 700})] {
            let mut record = valid_record();
            record["fico_score"] = value;
            assert!(matches!(
                validate(Some(&record)),
                Err(ValidationError::InvalidValue { feature: "fico_score", .. })
            ));
        }
    }

    #[test]
    fn test_fico_below_minimum() {
        let mut record = valid_record();
        record["fico_score"] = json!(200);
        assert_eq!(
            validate(Some(&record)),
            Err(ValidationError::OutOfRange {
                feature: "fico_score",
                value: 200.0,
                min: 300.0,
                max: 850.0,
            })
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut record = valid_record();
        record["fico_score"] = json!(850);
        record["credit_lines_outstanding"] = json!(0);
        assert!(validate(Some(&record)).is_ok());
    }

    #[test]
    fn test_first_failing_feature_wins() {
        let mut record = valid_record();
        record["loan_amt_outstanding"] = json!(-1);
        record["fico_score"] = json!("abc");
        assert!(matches!(
            validate(Some(&record)),
            Err(ValidationError::OutOfRange { feature: "loan_amt_outstanding", .. })
        ));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut record = valid_record();
        record["favourite_colour"] = json!("blue");
        assert!(validate(Some(&record)).is_ok());
    }

    #[test]
    fn test_vector_serializes_in_schema_order() {
        let vector = validate(Some(&valid_record())).unwrap();
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(
            json,
            r#"{"credit_lines_outstanding":5.0,"loan_amt_outstanding":1000.0,"total_debt_outstanding":2000.0,"income":50000.0,"years_employed":3.0,"fico_score":700.0}"#
        );
    }
}
