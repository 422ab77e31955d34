//! CreditRisk API
//!
//! HTTP service that validates applicant records and scores them with a
//! fitted credit-default model.

pub mod cli;
pub mod config;
pub mod routes;
pub mod service;
pub mod ui;

pub use cli::Cli;
pub use config::{CorsConfig, LimitsConfig, LogFormat, ServerConfig};
pub use routes::{create_router, ApiError};
pub use service::{predict_request, score_record, AppState, PredictionFailure};
