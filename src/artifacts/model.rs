//! Tree-ensemble classifier artifact
//!
//! Deserializes the trained binary classifier (a forest of decision trees)
//! and scores transformed feature matrices, returning the positive-class
//! probability per row.
//!
//! Artifacts written by older trainer versions lack the per-feature
//! `monotonic_cst` field on each tree. [`TreeEnsemble::load`] backfills it
//! once, at load time, across all ensemble members; scoring then behaves
//! identically for old and new artifacts for the whole process lifetime.

use std::path::Path;

use ndarray::ArrayView2;

use serde::Deserialize;

use crate::error::AppError;

/// Artifact format carrying the `monotonic_cst` field on every tree.
pub const ENSEMBLE_FORMAT_VERSION: u32 = 2;

fn legacy_format_version() -> u32 {
    1
}

/// One node of a decision tree. `feature == -1` marks a leaf.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    /// Training-sample class counts at this node: [retained, churned].
    pub value: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
    /// Per-feature monotonic constraint (0 = unconstrained). Absent in
    /// legacy artifacts; backfilled at load.
    #[serde(default)]
    pub monotonic_cst: Option<Vec<i8>>,
}

impl DecisionTree {
    /// Walk the tree for one row and return the leaf churn fraction.
    fn score_row(&self, row: &[f64]) -> Result<f64, AppError> {
        let mut index = 0usize;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| {
                AppError::Internal(format!("tree node {index} out of range"))
            })?;
            if node.feature < 0 {
                let total = node.value[0] + node.value[1];
                if total <= 0.0 {
                    return Err(AppError::SchemaMismatch(format!(
                        "leaf node {index} has non-positive sample total {total}"
                    )));
                }
                return Ok(node.value[1] / total);
            }
            let feature = node.feature as usize;
            let value = row.get(feature).ok_or_else(|| {
                AppError::SchemaMismatch(format!(
                    "tree split on feature {feature} but row has {} columns",
                    row.len()
                ))
            })?;
            index = if *value <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
    }
}

/// Trained forest. Probability is the mean of per-tree leaf churn fractions.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default = "legacy_format_version")]
    pub format_version: u32,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Load the classifier and apply the version migration once.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let mut ensemble: Self = super::read_json(path, "churn model")?;
        if ensemble.trees.is_empty() {
            return Err(AppError::Internal("churn model has no trees".to_string()));
        }
        ensemble.migrate();
        Ok(ensemble)
    }

    /// Backfill `monotonic_cst` on trees written by older trainer versions
    /// (all features unconstrained). Applied exactly once, at load time.
    fn migrate(&mut self) {
        let mut patched = 0usize;
        for tree in &mut self.trees {
            if tree.monotonic_cst.is_none() {
                tree.monotonic_cst = Some(vec![0; self.n_features]);
                patched += 1;
            }
        }
        if patched > 0 {
            tracing::info!(
                patched,
                total = self.trees.len(),
                from_version = self.format_version,
                "backfilled monotonic constraints on legacy trees"
            );
            self.format_version = ENSEMBLE_FORMAT_VERSION;
        }
    }

    /// Score a transformed matrix, returning the churn probability per row.
    ///
    /// The matrix width must match the training-time feature count, and every
    /// produced probability must land in [0, 1]; either violation is a
    /// `SchemaMismatch`, not a per-request data error.
    pub fn predict_proba(&self, matrix: ArrayView2<'_, f64>) -> Result<Vec<f64>, AppError> {
        if matrix.ncols() != self.n_features {
            return Err(AppError::SchemaMismatch(format!(
                "preprocessor output has {} features but model expects {}",
                matrix.ncols(),
                self.n_features
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.monotonic_cst.is_none() {
                return Err(AppError::Internal(format!(
                    "tree {i} is missing monotonic constraints; artifact was not migrated at load"
                )));
            }
        }

        let mut probabilities = Vec::with_capacity(matrix.nrows());
        for row in matrix.rows() {
            let row = row.as_slice().ok_or_else(|| {
                AppError::Internal("feature matrix row is not contiguous".to_string())
            })?;
            let mut sum = 0.0;
            for tree in &self.trees {
                sum += tree.score_row(row)?;
            }
            let probability = sum / self.trees.len() as f64;
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(AppError::SchemaMismatch(format!(
                    "classifier produced probability {probability} outside [0, 1]"
                )));
            }
            probabilities.push(probability);
        }
        Ok(probabilities)
    }
}
