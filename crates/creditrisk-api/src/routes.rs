//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use creditrisk_classifiers::ModelStatus;
use creditrisk_core::schema::{feature_names, ExamplePayload, FeatureLimits};
use creditrisk_core::PredictionResult;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::CorsConfig;
use crate::service::{self, AppState, PredictionFailure};
use crate::ui;

const AVAILABLE_ENDPOINTS: [&str; 4] = ["/", "/predict", "/ui", "/metrics"];

const GENERIC_ERROR_DETAIL: &str = "an internal error occurred";

/// Build the application router with its middleware stack
pub fn create_router(state: AppState) -> Router {
    let limits = &state.config.limits;

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs)))
        .layer(GlobalConcurrencyLimitLayer::new(limits.max_concurrent_requests))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(&state.config.cors));

    // Separate layer: responses must be mapped back to `Body` before CORS and timeout
    let body_limit = ServiceBuilder::new()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes));

    Router::new()
        .route("/", get(home))
        .route("/ui", get(ui::serve_ui))
        .route("/predict", post(predict))
        .route("/metrics", get(render_metrics))
        .fallback(fallback)
        .layer(body_limit)
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================================
// Informational endpoint
// ============================================================================

#[derive(Debug, Serialize)]
struct ServiceInfo {
    message: &'static str,
    status: &'static str,
    model_status: ModelStatus,
    endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
struct Endpoints {
    #[serde(rename = "/")]
    root: EndpointDoc,
    #[serde(rename = "/ui")]
    ui: EndpointDoc,
    #[serde(rename = "/predict")]
    predict: PredictDoc,
    #[serde(rename = "/metrics")]
    metrics: EndpointDoc,
}

#[derive(Debug, Serialize)]
struct EndpointDoc {
    method: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct PredictDoc {
    method: &'static str,
    description: &'static str,
    required_features: Vec<&'static str>,
    feature_limits: FeatureLimits,
    example_payload: ExamplePayload,
}

async fn home(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Welcome to the credit default prediction API",
        status: "healthy",
        model_status: state.gateway.status(),
        endpoints: Endpoints {
            root: EndpointDoc {
                method: "GET",
                description: "Service status and documentation",
            },
            ui: EndpointDoc {
                method: "GET",
                description: "Web form for interactive scoring",
            },
            predict: PredictDoc {
                method: "POST",
                description: "Predict credit default risk for one applicant",
                required_features: feature_names().collect(),
                feature_limits: FeatureLimits,
                example_payload: ExamplePayload,
            },
            metrics: EndpointDoc {
                method: "GET",
                description: "Prometheus metrics",
            },
        },
    })
}

// ============================================================================
// Prediction endpoint
// ============================================================================

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResult>, ApiError> {
    metrics::counter!("creditrisk_requests_total").increment(1);

    service::predict_request(&state.gateway, &body)
        .await
        .map(Json)
        .map_err(|failure| ApiError::from_failure(failure, state.config.debug))
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn fallback() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "route not found",
            "available_endpoints": AVAILABLE_ENDPOINTS,
        })),
    )
        .into_response()
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error ({request_id}): {detail}")]
    Validation { request_id: String, detail: String },

    #[error("prediction failed ({request_id}): {detail}")]
    Internal { request_id: String, detail: String },
}

impl ApiError {
    /// Map a service failure; internal details are only exposed in debug mode
    pub fn from_failure(failure: PredictionFailure, debug: bool) -> Self {
        match failure {
            PredictionFailure::ValidationFailed { request_id, error } => Self::Validation {
                request_id,
                detail: error.to_string(),
            },
            PredictionFailure::InternalFailure { request_id, error } => Self::Internal {
                request_id,
                detail: if debug {
                    error.to_string()
                } else {
                    GENERIC_ERROR_DETAIL.to_string()
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, request_id, detail) = match self {
            ApiError::Validation { request_id, detail } => {
                (StatusCode::BAD_REQUEST, "validation error", request_id, detail)
            }
            ApiError::Internal { request_id, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "prediction failed",
                request_id,
                detail,
            ),
        };

        let body = json!({
            "error": error,
            "request_id": request_id,
            "detail": detail,
        });

        (status, Json(body)).into_response()
    }
}
