//! Load-once access to the scoring model

use crate::loader::ArtifactLoader;
use crate::model::RiskModel;
use creditrisk_core::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// What the gateway can say about the model without scoring anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// A deserialized model is cached and ready
    Loaded,
    /// The artifact exists but has not been loaded successfully yet
    NotLoaded,
    /// No artifact at the configured location
    Unavailable,
}

/// Holds the model handle for the lifetime of the process.
///
/// The first successful [`ensure_loaded`](Self::ensure_loaded) caches the
/// handle; concurrent first callers wait on the same load instead of reading
/// the artifact again. A failed load is returned to the caller and not
/// cached, so a later request can pick up an artifact deployed afterwards.
pub struct ModelGateway {
    loader: Option<Arc<dyn ArtifactLoader>>,
    model: OnceCell<Arc<dyn RiskModel>>,
}

impl ModelGateway {
    /// Create a gateway that loads lazily through `loader`
    pub fn new(loader: Arc<dyn ArtifactLoader>) -> Self {
        Self {
            loader: Some(loader),
            model: OnceCell::new(),
        }
    }

    /// Create a gateway around an already constructed model
    pub fn preloaded(model: Arc<dyn RiskModel>) -> Self {
        Self {
            loader: None,
            model: OnceCell::new_with(Some(model)),
        }
    }

    /// Return the cached model, loading it on first use
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn RiskModel>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let loader = self
                    .loader
                    .as_ref()
                    .ok_or_else(|| Error::internal("model gateway has no artifact loader"))?;
                Self::load_with(loader.as_ref()).await
            })
            .await?;

        Ok(Arc::clone(model))
    }

    async fn load_with(loader: &dyn ArtifactLoader) -> Result<Arc<dyn RiskModel>> {
        info!("Loading model from: {}", loader.describe());
        let start = Instant::now();

        match loader.load().await {
            Ok(model) => {
                metrics::counter!("creditrisk_model_loads_total", "result" => "success").increment(1);
                info!(
                    "✓ Loaded model '{}' ({} features) in {:?}",
                    model.name(),
                    model.n_features(),
                    start.elapsed()
                );
                Ok(model)
            }
            Err(e) => {
                metrics::counter!("creditrisk_model_loads_total", "result" => "failure").increment(1);
                error!("✗ Failed to load model: {}", e);
                Err(e)
            }
        }
    }

    /// Whether a model is cached
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Current model status
    pub fn status(&self) -> ModelStatus {
        if self.is_loaded() {
            ModelStatus::Loaded
        } else if self.loader.as_ref().is_some_and(|l| l.is_available()) {
            ModelStatus::NotLoaded
        } else {
            ModelStatus::Unavailable
        }
    }

    /// Artifact location, if the gateway loads from one
    pub fn source(&self) -> Option<String> {
        self.loader.as_ref().map(|l| l.describe())
    }
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("source", &self.source())
            .field("status", &self.status())
            .finish()
    }
}
