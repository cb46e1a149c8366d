//! Model metadata artifact

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Metadata written next to the trained model. Carries the decision threshold
/// and the exact post-transform feature-column order the model was trained
/// on; both are invariant once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Probability cutoff chosen for business cost trade-offs (distinct
    /// from 0.5) above which a rider is labeled "churn".
    pub business_threshold: f64,

    /// Column names emerging from the preprocessor, in model input order.
    pub feature_columns: Vec<String>,

    #[serde(default)]
    pub model_version: Option<String>,

    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

impl ModelMetadata {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let metadata: Self = super::read_json(path, "model metadata")?;
        if !(0.0..=1.0).contains(&metadata.business_threshold) {
            return Err(AppError::Internal(format!(
                "business_threshold must be in [0, 1], got {}",
                metadata.business_threshold
            )));
        }
        Ok(metadata)
    }
}
