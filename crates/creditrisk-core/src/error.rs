//! Error types for CreditRisk
//!
//! Client-caused failures are [`ValidationError`](crate::ValidationError)s and
//! never reach this type; everything here is server-side.

use std::fmt::Display;

/// Result type alias using CreditRisk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CreditRisk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model artifact missing, unreadable, or corrupt
    #[error("failed to load model from {path}: {cause}")]
    ModelLoad { path: String, cause: String },

    /// The loaded model failed while scoring a vector
    #[error("inference error: {cause}")]
    Inference { cause: String },

    /// Settings the server cannot run with
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(path: impl Display, cause: impl Display) -> Self {
        Self::ModelLoad {
            path: path.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Create a new inference error
    pub fn inference(cause: impl Into<String>) -> Self {
        Self::Inference {
            cause: cause.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
