//! Serialized model artifacts and the models they describe
//!
//! Artifacts are JSON documents exported from the training environment and
//! tagged by `kind`. Each kind deserializes into a type that implements
//! [`RiskModel`] directly; structural checks run before a model is handed out
//! so that inference never walks a malformed tree.

use crate::model::{argmax_label, check_width, RiskModel};
use creditrisk_core::{ClassProbabilities, Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structural problems found in an artifact
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The artifact was fitted on a different number of columns
    #[error("artifact declares {declared} features, expected {expected}")]
    FeatureCount { declared: usize, expected: usize },

    /// A forest without trees cannot produce probabilities
    #[error("random forest has no trees")]
    EmptyForest,

    /// A tree is not a well-formed binary decision tree
    #[error("tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    /// Linear model parameters are inconsistent
    #[error("logistic regression: {0}")]
    InvalidLinear(String),

    /// The document could not be parsed
    #[error("malformed artifact: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A fitted model as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    /// Parse an artifact from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, ArtifactError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check the artifact is usable with vectors of `expected` columns
    pub fn validate(&self, expected: usize) -> std::result::Result<(), ArtifactError> {
        match self {
            Self::RandomForest(forest) => forest.validate(expected),
            Self::LogisticRegression(linear) => linear.validate(expected),
        }
    }

    /// Validate and wrap as a shareable model handle
    pub fn into_model(
        self,
        expected: usize,
    ) -> std::result::Result<Arc<dyn RiskModel>, ArtifactError> {
        self.validate(expected)?;
        Ok(match self {
            Self::RandomForest(forest) => Arc::new(forest),
            Self::LogisticRegression(linear) => Arc::new(linear),
        })
    }
}

// ============================================================================
// Random forest
// ============================================================================

/// Ensemble of decision trees; probabilities are averaged across trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of input columns
    pub n_features: usize,

    /// Fitted trees
    pub trees: Vec<DecisionTree>,
}

/// Flattened binary tree; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node: either a threshold split or a leaf with class weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[w0, w1]` (sample counts or fractions)
    Leaf { value: [f64; 2] },
}

impl DecisionTree {
    fn validate(&self, tree: usize, n_features: usize) -> std::result::Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::InvalidTree { tree, reason };

        if self.nodes.is_empty() {
            return Err(invalid("tree has no nodes".to_string()));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(invalid(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} has a non-finite threshold", idx)));
                    }
                    // Children after their parent rules out cycles
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(invalid(format!(
                                "node {} has out-of-order child {}",
                                idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0)
                        || !total.is_finite()
                        || total <= 0.0
                    {
                        return Err(invalid(format!("leaf {} has invalid class weights", idx)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `features`
    fn leaf_distribution(&self, features: &[f64]) -> Result<[f64; 2]> {
        let mut idx = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => {
                    let total = value[0] + value[1];
                    return Ok([value[0] / total, value[1] / total]);
                }
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).ok_or_else(|| {
                        Error::inference(format!("split references missing feature {}", feature))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                None => return Err(Error::inference(format!("node {} does not exist", idx))),
            }
        }
        Err(Error::inference("tree traversal did not reach a leaf"))
    }
}

impl RandomForest {
    fn validate(&self, expected: usize) -> std::result::Result<(), ArtifactError> {
        if self.n_features != expected {
            return Err(ArtifactError::FeatureCount {
                declared: self.n_features,
                expected,
            });
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::EmptyForest);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(idx, tree)| tree.validate(idx, self.n_features))
    }
}

impl RiskModel for RandomForest {
    fn classify(&self, features: &[f64]) -> Result<u8> {
        let probs = self.class_probabilities(features)?;
        Ok(argmax_label(&probs))
    }

    fn class_probabilities(&self, features: &[f64]) -> Result<ClassProbabilities> {
        check_width(features, self.n_features)?;
        if self.trees.is_empty() {
            return Err(Error::inference("random forest has no trees"));
        }

        let mut sum = [0.0_f64; 2];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(features)?;
            sum[0] += dist[0];
            sum[1] += dist[1];
        }
        let n = self.trees.len() as f64;
        Ok(ClassProbabilities::from_pair(sum[0] / n, sum[1] / n))
    }

    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

// ============================================================================
// Logistic regression
// ============================================================================

/// Linear model with a logistic link, optionally preceded by standardization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One weight per feature, schema order
    pub coefficients: Vec<f64>,

    /// Bias term
    pub intercept: f64,

    /// Standardization applied before the linear term
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

/// Per-column `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl LogisticRegression {
    fn validate(&self, expected: usize) -> std::result::Result<(), ArtifactError> {
        if self.coefficients.len() != expected {
            return Err(ArtifactError::FeatureCount {
                declared: self.coefficients.len(),
                expected,
            });
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::InvalidLinear(
                "parameters must be finite".to_string(),
            ));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != expected || scaler.scale.len() != expected {
                return Err(ArtifactError::InvalidLinear(format!(
                    "scaler must have {} columns",
                    expected
                )));
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0)
                || scaler.mean.iter().any(|m| !m.is_finite())
            {
                return Err(ArtifactError::InvalidLinear(
                    "scaler has zero or non-finite entries".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn decision(&self, features: &[f64]) -> f64 {
        let linear: f64 = match &self.scaler {
            Some(scaler) => features
                .iter()
                .zip(&scaler.mean)
                .zip(&scaler.scale)
                .zip(&self.coefficients)
                .map(|(((x, mean), scale), coef)| coef * (x - mean) / scale)
                .sum(),
            None => features
                .iter()
                .zip(&self.coefficients)
                .map(|(x, coef)| coef * x)
                .sum(),
        };
        self.intercept + linear
    }
}

impl RiskModel for LogisticRegression {
    fn classify(&self, features: &[f64]) -> Result<u8> {
        let probs = self.class_probabilities(features)?;
        Ok(argmax_label(&probs))
    }

    fn class_probabilities(&self, features: &[f64]) -> Result<ClassProbabilities> {
        check_width(features, self.coefficients.len())?;
        let p_default = 1.0 / (1.0 + (-self.decision(features)).exp());
        if !p_default.is_finite() {
            return Err(Error::inference("logistic output is not finite"));
        }
        Ok(ClassProbabilities::from_default(p_default))
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}
