//! Extension points for model artifact loading.

use crate::artifact::ModelArtifact;
use crate::model::RiskModel;
use creditrisk_core::{Error, Result, FEATURE_COUNT};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Pluggable backend that turns a stored artifact into a model handle.
///
/// Implement this trait to support other artifact formats or storage
/// locations without touching the gateway or the request path.
#[async_trait::async_trait]
pub trait ArtifactLoader: Send + Sync {
    /// Read and deserialize the artifact
    async fn load(&self) -> Result<Arc<dyn RiskModel>>;

    /// Where the artifact lives, for logs and error messages
    fn describe(&self) -> String;

    /// Whether the artifact is present (without deserializing it)
    fn is_available(&self) -> bool;
}

/// Loads a JSON [`ModelArtifact`] from the local filesystem
#[derive(Debug, Clone)]
pub struct JsonArtifactLoader {
    path: PathBuf,
}

impl JsonArtifactLoader {
    /// Create a loader for the artifact at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Artifact location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ArtifactLoader for JsonArtifactLoader {
    async fn load(&self) -> Result<Arc<dyn RiskModel>> {
        let location = self.path.display();

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::model_load(&location, e))?;
        debug!("Read {} bytes from {}", bytes.len(), location);

        ModelArtifact::from_slice(&bytes)
            .and_then(|artifact| artifact.into_model(FEATURE_COUNT))
            .map_err(|e| Error::model_load(&location, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }
}
