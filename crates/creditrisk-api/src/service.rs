//! Prediction service: validation, inference, and result assembly

use creditrisk_classifiers::{JsonArtifactLoader, ModelGateway};
use creditrisk_core::{validate, Error, PredictionResult, ValidationError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Load-once access to the scoring model
    pub gateway: Arc<ModelGateway>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Self {
        let loader = JsonArtifactLoader::new(config.model_path.clone());
        let gateway = ModelGateway::new(Arc::new(loader));
        Self::with_gateway(config, gateway, metrics_handle)
    }

    /// Build state around an existing gateway
    pub fn with_gateway(
        config: ServerConfig,
        gateway: ModelGateway,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            metrics_handle,
        }
    }

    /// Try to load the model up front; failure is logged, not fatal
    pub async fn preload_model(&self) {
        if let Err(e) = self.gateway.ensure_loaded().await {
            warn!("Model could not be loaded at startup: {}", e);
        }
    }
}

/// Why a prediction request did not produce a result
#[derive(Debug)]
pub enum PredictionFailure {
    /// The submitted record was rejected; no inference was attempted
    ValidationFailed {
        request_id: String,
        error: ValidationError,
    },

    /// The model could not be loaded or failed during scoring
    InternalFailure { request_id: String, error: Error },
}

impl PredictionFailure {
    /// Correlation id of the failed request
    pub fn request_id(&self) -> &str {
        match self {
            Self::ValidationFailed { request_id, .. } | Self::InternalFailure { request_id, .. } => {
                request_id
            }
        }
    }
}

/// Handle one prediction request from its raw body
pub async fn predict_request(
    gateway: &ModelGateway,
    body: &[u8],
) -> Result<PredictionResult, PredictionFailure> {
    let request_id = generate_request_id();
    info!("New prediction request - ID: {}", request_id);

    let start = Instant::now();
    let outcome = match decode_body(body) {
        Ok(record) => score_record(gateway, request_id, record.as_ref()).await,
        Err(error) => Err(PredictionFailure::ValidationFailed { request_id, error }),
    };

    metrics::histogram!("creditrisk_prediction_latency_us")
        .record(start.elapsed().as_micros() as f64);
    record_outcome(&outcome);
    outcome
}

/// Validate a decoded record and score it with the gateway's model
pub async fn score_record(
    gateway: &ModelGateway,
    request_id: String,
    record: Option<&Value>,
) -> Result<PredictionResult, PredictionFailure> {
    debug!("Data received - ID {}: {:?}", request_id, record);

    let features = match validate(record) {
        Ok(features) => features,
        Err(error) => return Err(PredictionFailure::ValidationFailed { request_id, error }),
    };

    let scored = async {
        let model = gateway.ensure_loaded().await?;
        let prediction = model.classify(features.as_slice())?;
        let probability = model.class_probabilities(features.as_slice())?;
        Ok::<_, Error>((prediction, probability))
    }
    .await;

    match scored {
        Ok((prediction, probability)) => {
            let result = PredictionResult::new(request_id, prediction, probability, features);
            info!(
                "Prediction succeeded - ID {}: {}",
                result.request_id, result.interpretation
            );
            Ok(result)
        }
        Err(error) => Err(PredictionFailure::InternalFailure { request_id, error }),
    }
}

/// Empty bodies count as an absent record; anything else must be JSON
fn decode_body(body: &[u8]) -> Result<Option<Value>, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ValidationError::MalformedBody {
            reason: e.to_string(),
        })
}

fn record_outcome(outcome: &Result<PredictionResult, PredictionFailure>) {
    let label = match outcome {
        Ok(_) => "success",
        Err(PredictionFailure::ValidationFailed { request_id, error }) => {
            warn!("Validation error - ID {}: {}", request_id, error);
            "validation_error"
        }
        Err(PredictionFailure::InternalFailure { request_id, error }) => {
            error!("Internal error - ID {}: {}", request_id, error);
            "internal_error"
        }
    };
    metrics::counter!("creditrisk_predictions_total", "outcome" => label).increment(1);
}

/// Generate a request ID: local timestamp with microseconds plus a random suffix
pub fn generate_request_id() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%6f");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", timestamp, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use creditrisk_classifiers::RiskModel;
    use creditrisk_core::ClassProbabilities;
    use serde_json::json;

    struct FixedModel {
        p_default: f64,
    }

    impl RiskModel for FixedModel {
        fn classify(&self, _features: &[f64]) -> creditrisk_core::Result<u8> {
            Ok(u8::from(self.p_default > 0.5))
        }

        fn class_probabilities(
            &self,
            _features: &[f64],
        ) -> creditrisk_core::Result<ClassProbabilities> {
            Ok(ClassProbabilities::from_default(self.p_default))
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn n_features(&self) -> usize {
            6
        }
    }

    struct BrokenModel;

    impl RiskModel for BrokenModel {
        fn classify(&self, _features: &[f64]) -> creditrisk_core::Result<u8> {
            Err(Error::inference("tree walked off the end"))
        }

        fn class_probabilities(
            &self,
            _features: &[f64],
        ) -> creditrisk_core::Result<ClassProbabilities> {
            Err(Error::inference("tree walked off the end"))
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn n_features(&self) -> usize {
            6
        }
    }

    fn body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "credit_lines_outstanding": 5,
            "loan_amt_outstanding": 1000,
            "total_debt_outstanding": 2000,
            "income": 50000,
            "years_employed": 3,
            "fico_score": 700
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_assembles_result() {
        let gateway = ModelGateway::preloaded(Arc::new(FixedModel { p_default: 0.8 }));
        let result = predict_request(&gateway, &body()).await.unwrap();

        assert_eq!(result.prediction, 1);
        assert!(result.is_default_risk());
        assert_eq!(result.probability.default, 0.8);
        assert!(result.probability.is_normalized());
        assert_eq!(result.interpretation, "Default risk detected");
        assert_eq!(result.features_received.get("fico_score"), Some(700.0));
        assert!(!result.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_model() {
        let gateway = ModelGateway::preloaded(Arc::new(BrokenModel));
        let failure = predict_request(&gateway, b"{}").await.unwrap_err();

        match failure {
            PredictionFailure::ValidationFailed { error, .. } => {
                assert!(matches!(error, ValidationError::MissingFeatures { ref names } if names.len() == 6));
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_input() {
        let gateway = ModelGateway::preloaded(Arc::new(FixedModel { p_default: 0.1 }));
        for raw in ["", "  \n", "null"] {
            let failure = predict_request(&gateway, raw.as_bytes()).await.unwrap_err();
            assert!(matches!(
                failure,
                PredictionFailure::ValidationFailed {
                    error: ValidationError::EmptyInput,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let gateway = ModelGateway::preloaded(Arc::new(FixedModel { p_default: 0.1 }));
        let failure = predict_request(&gateway, b"{\"income\": ").await.unwrap_err();
        assert!(matches!(
            failure,
            PredictionFailure::ValidationFailed {
                error: ValidationError::MalformedBody { .. },
                ..
            }
        ));
        assert!(!failure.request_id().is_empty());
    }

    #[tokio::test]
    async fn test_inference_error_is_internal() {
        let gateway = ModelGateway::preloaded(Arc::new(BrokenModel));
        let failure = predict_request(&gateway, &body()).await.unwrap_err();
        assert!(matches!(
            failure,
            PredictionFailure::InternalFailure {
                error: Error::Inference { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_score_record_keeps_request_id() {
        let gateway = ModelGateway::preloaded(Arc::new(FixedModel { p_default: 0.3 }));
        let record: Value = serde_json::from_slice(&body()).unwrap();
        let result = score_record(&gateway, "req-42".to_string(), Some(&record))
            .await
            .unwrap();
        assert_eq!(result.request_id, "req-42");
        assert_eq!(result.prediction, 0);
    }

    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 8);
        assert_ne!(id, generate_request_id());
    }
}
