//! On-disk model artifacts
//!
//! Three JSON documents produced by the offline training process: the fitted
//! preprocessing pipeline, the tree-ensemble classifier, and a metadata
//! mapping. Loaded once at process start, read-only for the process lifetime.

pub mod metadata;
pub mod model;
pub mod preprocessor;

pub use metadata::ModelMetadata;
pub use model::TreeEnsemble;
pub use preprocessor::Preprocessor;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Read and parse a JSON artifact. A missing file is `ArtifactNotFound`;
/// an unreadable or malformed file is `Internal`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    if !path.exists() {
        return Err(AppError::ArtifactNotFound(format!(
            "{what} not found at {}",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Internal(format!("failed to read {what} from {}: {e}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::Internal(format!("failed to parse {what} at {}: {e}", path.display()))
    })
}
