//! Fitted preprocessing pipeline
//!
//! Wraps the column transform fitted offline: robust scaling for numeric
//! columns, ordinal encoding for ordered categoricals (loyalty tier, RFMS
//! segment), one-hot encoding for the nominal categorical (city). The
//! transform is deterministic; all fitted parameters come from the artifact.

use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use crate::error::AppError;
use crate::schema::ChurnFeatures;

/// Fitted robust-scaler parameters for one numeric column.
#[derive(Debug, Clone, Deserialize)]
pub struct NumericScaler {
    pub column: String,
    /// Training-set median
    pub center: f64,
    /// Training-set interquartile range
    pub scale: f64,
}

impl NumericScaler {
    fn apply(&self, value: f64) -> f64 {
        // Zero-IQR columns pass through unscaled, matching the fitting library.
        if self.scale == 0.0 {
            value - self.center
        } else {
            (value - self.center) / self.scale
        }
    }
}

/// Fitted category order for one ordinal column.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdinalEncoding {
    pub column: String,
    pub categories: Vec<String>,
}

/// Fitted category set for one one-hot column.
#[derive(Debug, Clone, Deserialize)]
pub struct OneHotEncoding {
    pub column: String,
    pub categories: Vec<String>,
}

/// The full fitted column transform. Output column order is numeric columns,
/// then ordinal columns, then the expanded one-hot columns, exactly as fitted.
#[derive(Debug, Clone, Deserialize)]
pub struct Preprocessor {
    pub numeric: Vec<NumericScaler>,
    pub ordinal: Vec<OrdinalEncoding>,
    pub one_hot: Vec<OneHotEncoding>,
}

impl Preprocessor {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        super::read_json(path, "preprocessor")
    }

    /// Number of columns the transform produces.
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self.ordinal.len()
            + self.one_hot.iter().map(|e| e.categories.len()).sum::<usize>()
    }

    /// Post-transform column names, in output order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::with_capacity(self.output_width());
        columns.extend(self.numeric.iter().map(|s| s.column.clone()));
        columns.extend(self.ordinal.iter().map(|e| e.column.clone()));
        for encoding in &self.one_hot {
            for category in &encoding.categories {
                columns.push(format!("{}_{}", encoding.column, category));
            }
        }
        columns
    }

    /// Transform validated raw rows into the numeric matrix the model
    /// expects. A category absent from the fitted encoder means the artifact
    /// and the schema have drifted apart, which is a deploy-time bug.
    pub fn transform(&self, rows: &[ChurnFeatures]) -> Result<Array2<f64>, AppError> {
        let width = self.output_width();
        let mut matrix = Array2::<f64>::zeros((rows.len(), width));

        for (r, row) in rows.iter().enumerate() {
            let mut c = 0;

            for scaler in &self.numeric {
                let raw = row.numeric(&scaler.column).ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "preprocessor references unknown numeric column {:?}",
                        scaler.column
                    ))
                })?;
                matrix[[r, c]] = scaler.apply(raw);
                c += 1;
            }

            for encoding in &self.ordinal {
                let raw = row.categorical(&encoding.column).ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "preprocessor references unknown categorical column {:?}",
                        encoding.column
                    ))
                })?;
                let index = encoding
                    .categories
                    .iter()
                    .position(|category| category == raw)
                    .ok_or_else(|| {
                        AppError::SchemaMismatch(format!(
                            "category {raw:?} of column {:?} not present in fitted ordinal encoder",
                            encoding.column
                        ))
                    })?;
                matrix[[r, c]] = index as f64;
                c += 1;
            }

            for encoding in &self.one_hot {
                let raw = row.categorical(&encoding.column).ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "preprocessor references unknown categorical column {:?}",
                        encoding.column
                    ))
                })?;
                let index = encoding
                    .categories
                    .iter()
                    .position(|category| category == raw)
                    .ok_or_else(|| {
                        AppError::SchemaMismatch(format!(
                            "category {raw:?} of column {:?} not present in fitted one-hot encoder",
                            encoding.column
                        ))
                    })?;
                matrix[[r, c + index]] = 1.0;
                c += encoding.categories.len();
            }
        }

        Ok(matrix)
    }
}
