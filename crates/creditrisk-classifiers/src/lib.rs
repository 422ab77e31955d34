//! CreditRisk Classifiers
//!
//! Fitted credit-default models behind a small capability trait.
//!
//! - [`RiskModel`]: `classify` + `class_probabilities` over a schema-ordered vector
//! - [`ModelArtifact`]: JSON artifact formats (random forest, logistic regression)
//! - [`ArtifactLoader`]: pluggable artifact source, with a filesystem JSON loader
//! - [`ModelGateway`]: process-lifetime, load-once access to the model
//!
//! Scoring is synchronous and CPU-only; the only I/O is the one-time load.

pub mod artifact;
pub mod gateway;
pub mod loader;
pub mod model;

pub use artifact::{ArtifactError, ModelArtifact};
pub use gateway::{ModelGateway, ModelStatus};
pub use loader::{ArtifactLoader, JsonArtifactLoader};
pub use model::RiskModel;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifact::{LogisticRegression, ModelArtifact, RandomForest};
    pub use crate::gateway::{ModelGateway, ModelStatus};
    pub use crate::loader::{ArtifactLoader, JsonArtifactLoader};
    pub use crate::model::RiskModel;
}
