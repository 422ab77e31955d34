//! Risk model trait and common helpers

use creditrisk_core::{ClassProbabilities, Error, Result};

/// Capability set of a fitted binary credit-risk model.
///
/// Implementations are read-only after construction and are shared across
/// request handlers behind an `Arc`. Callers pass vectors that have already
/// been validated, in feature-schema column order.
pub trait RiskModel: Send + Sync {
    /// Predict the class label (0 = no default, 1 = default)
    fn classify(&self, features: &[f64]) -> Result<u8>;

    /// Estimate per-class probabilities; they sum to 1
    fn class_probabilities(&self, features: &[f64]) -> Result<ClassProbabilities>;

    /// Get the model name
    fn name(&self) -> &str;

    /// Number of input columns the model was fitted on
    fn n_features(&self) -> usize;
}

/// Fail with an inference error when a vector does not match the fitted width
pub(crate) fn check_width(features: &[f64], expected: usize) -> Result<()> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(Error::inference(format!(
            "expected {} features, got {}",
            expected,
            features.len()
        )))
    }
}

/// Label chosen by `argmax` over `[p0, p1]`; ties go to class 0
pub(crate) fn argmax_label(probs: &ClassProbabilities) -> u8 {
    if probs.default > probs.no_default {
        creditrisk_core::types::DEFAULT
    } else {
        creditrisk_core::types::NO_DEFAULT
    }
}
