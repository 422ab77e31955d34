//! Property tests for scoring valid records end to end

use creditrisk_api::score_record;
use creditrisk_classifiers::{ModelArtifact, ModelGateway};
use creditrisk_core::schema::{FEATURE_COUNT, FEATURE_SCHEMA};
use creditrisk_core::types::{interpretation, DEFAULT};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn bundled_forest() -> ModelGateway {
    let bytes = include_bytes!("../../../model/credit_model.json");
    let model = ModelArtifact::from_slice(bytes)
        .and_then(|artifact| artifact.into_model(FEATURE_COUNT))
        .unwrap();
    ModelGateway::preloaded(model)
}

fn in_bounds_values() -> impl Strategy<Value = Vec<f64>> {
    FEATURE_SCHEMA
        .iter()
        .map(|spec| spec.min..=spec.max)
        .collect::<Vec<_>>()
}

proptest! {
    #[test]
    fn valid_records_score_to_a_distribution(values in in_bounds_values()) {
        let record: Map<String, Value> = FEATURE_SCHEMA
            .iter()
            .zip(values.iter())
            .map(|(spec, value)| (spec.name.to_string(), Value::from(*value)))
            .collect();
        let record = Value::Object(record);

        let gateway = bundled_forest();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = runtime
            .block_on(score_record(&gateway, "prop".to_string(), Some(&record)))
            .unwrap();

        prop_assert!(result.probability.is_normalized());
        prop_assert!(result.prediction <= 1);
        prop_assert_eq!(result.interpretation, interpretation(result.prediction));
        prop_assert_eq!(
            result.prediction == DEFAULT,
            result.interpretation == "Default risk detected"
        );
        prop_assert_eq!(result.features_received.as_slice(), values.as_slice());
    }
}
