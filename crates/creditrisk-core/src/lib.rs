//! CreditRisk Core
//!
//! Types and validation shared across CreditRisk components.
//!
//! This crate provides:
//! - The feature schema (names, bounds, model column order)
//! - Request validation producing a typed feature vector
//! - Prediction result types
//! - Error types and result handling

pub mod error;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use schema::{FeatureSpec, FEATURE_COUNT, FEATURE_SCHEMA};
pub use types::{ClassProbabilities, PredictionResult};
pub use validation::{validate, FeatureVector, ValidationError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::schema::{FeatureSpec, FEATURE_COUNT, FEATURE_SCHEMA};
    pub use crate::types::{ClassProbabilities, PredictionResult};
    pub use crate::validation::{validate, FeatureVector, ValidationError};
}
