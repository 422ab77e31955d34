//! Core types for CreditRisk predictions

use crate::validation::FeatureVector;
use serde::Serialize;

/// Class label for an applicant expected to repay
pub const NO_DEFAULT: u8 = 0;

/// Class label for an applicant expected to default
pub const DEFAULT: u8 = 1;

/// Per-class probabilities produced by a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    /// Probability of class 1 (default)
    pub default: f64,

    /// Probability of class 0 (no default)
    pub no_default: f64,
}

impl ClassProbabilities {
    /// Build from the probability of default; the complement goes to class 0
    pub fn from_default(p_default: f64) -> Self {
        Self {
            default: p_default,
            no_default: 1.0 - p_default,
        }
    }

    /// Build from a `[p0, p1]` pair as returned by `predict_proba`
    pub fn from_pair(p_no_default: f64, p_default: f64) -> Self {
        Self {
            default: p_default,
            no_default: p_no_default,
        }
    }

    /// Check the pair is a distribution within a small tolerance
    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.default)
            && (0.0..=1.0).contains(&self.no_default)
            && (self.default + self.no_default - 1.0).abs() < 1e-9
    }
}

/// Human-readable reading of a class label
pub fn interpretation(prediction: u8) -> &'static str {
    if prediction == DEFAULT {
        "Default risk detected"
    } else {
        "No default risk detected"
    }
}

/// Successful response for one prediction request
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Correlation id attached to every outcome
    pub request_id: String,

    /// Predicted class (0 = no default, 1 = default)
    pub prediction: u8,

    /// Class probabilities
    pub probability: ClassProbabilities,

    /// Validated values actually fed to the model
    pub features_received: FeatureVector,

    /// Fixed text keyed on `prediction`
    pub interpretation: &'static str,
}

impl PredictionResult {
    /// Assemble a result; the interpretation is derived from the label
    pub fn new(
        request_id: impl Into<String>,
        prediction: u8,
        probability: ClassProbabilities,
        features_received: FeatureVector,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            prediction,
            probability,
            features_received,
            interpretation: interpretation(prediction),
        }
    }

    /// Whether the model flagged default risk
    pub fn is_default_risk(&self) -> bool {
        self.prediction == DEFAULT
    }
}
