//! Churn inference service
//!
//! Sole owner of the loaded artifacts and derived configuration. The state is
//! decided once at process start: artifacts either load (`Ready`) or they do
//! not (`Unavailable`), and neither state is ever exited. Loaded artifacts
//! are read-only, so the service is shared across requests without locking.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artifacts::{ModelMetadata, Preprocessor, TreeEnsemble};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::recommend::RecommendationTable;
use crate::risk::RiskBands;
use crate::schema::ChurnFeatures;

/// Everything read from disk at startup, plus when it happened.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub preprocessor: Preprocessor,
    pub model: TreeEnsemble,
    pub metadata: ModelMetadata,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
enum ModelState {
    Ready(Box<LoadedArtifacts>),
    Unavailable { reason: String },
}

/// One scored rider. The label is derived from the probability and threshold,
/// never independent of them.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub churn_probability: f64,
    pub churn_label: u8,
    pub threshold: f64,
    pub risk_level: String,
    pub recommendation: String,
}

pub struct ChurnService {
    state: ModelState,
    risk_bands: RiskBands,
    recommendations: RecommendationTable,
}

impl ChurnService {
    /// Load artifacts from the configured directory. Failure does not abort
    /// the process: the service comes up permanently unavailable and the API
    /// keeps answering health checks and 503s.
    pub fn load(config: &Config, recommendations: RecommendationTable) -> Self {
        match Self::load_artifacts(config) {
            Ok(artifacts) => {
                tracing::info!(
                    threshold = artifacts.metadata.business_threshold,
                    features = artifacts.metadata.feature_columns.len(),
                    trees = artifacts.model.trees.len(),
                    "churn model loaded"
                );
                let risk_bands =
                    RiskBands::from_profile(config, artifacts.metadata.business_threshold);
                Self {
                    state: ModelState::Ready(Box::new(artifacts)),
                    risk_bands,
                    recommendations,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load model artifacts; serving unavailable");
                Self {
                    state: ModelState::Unavailable {
                        reason: e.to_string(),
                    },
                    risk_bands: RiskBands::four_tier(),
                    recommendations,
                }
            }
        }
    }

    fn load_artifacts(config: &Config) -> AppResult<LoadedArtifacts> {
        let dir = &config.artifact_dir;
        let preprocessor = Preprocessor::load(&dir.join("preprocessor.json"))?;
        let model = TreeEnsemble::load(&dir.join("churn_model.json"))?;
        let metadata = ModelMetadata::load(&dir.join("churn_model_metadata.json"))?;

        // Drift between artifacts is a deploy-time bug; refuse to serve.
        let produced = preprocessor.output_width();
        let expected = metadata.feature_columns.len();
        if produced != expected {
            return Err(AppError::SchemaMismatch(format!(
                "preprocessor produces {produced} columns but metadata lists {expected} feature columns"
            )));
        }
        if expected != model.n_features {
            return Err(AppError::SchemaMismatch(format!(
                "metadata lists {expected} feature columns but model expects {}",
                model.n_features
            )));
        }
        if preprocessor.output_columns() != metadata.feature_columns {
            return Err(AppError::SchemaMismatch(
                "preprocessor column order differs from metadata feature_columns".to_string(),
            ));
        }

        Ok(LoadedArtifacts {
            preprocessor,
            model,
            metadata,
            loaded_at: Utc::now(),
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    fn artifacts(&self) -> AppResult<&LoadedArtifacts> {
        match &self.state {
            ModelState::Ready(artifacts) => Ok(artifacts),
            ModelState::Unavailable { reason } => Err(AppError::Unavailable(format!(
                "Model not loaded: {reason}"
            ))),
        }
    }

    /// The business decision threshold in effect.
    pub fn threshold(&self) -> AppResult<f64> {
        Ok(self.artifacts()?.metadata.business_threshold)
    }

    /// Number of post-transform feature columns.
    pub fn feature_count(&self) -> AppResult<usize> {
        Ok(self.artifacts()?.metadata.feature_columns.len())
    }

    /// Score a single rider: validate, transform, score, threshold, tier,
    /// recommend.
    pub fn predict_one(&self, raw: &ChurnFeatures) -> AppResult<Prediction> {
        raw.validate()?;
        let mut predictions = self.score_validated(std::slice::from_ref(raw))?;
        predictions
            .pop()
            .ok_or_else(|| AppError::Internal("scoring produced no result".to_string()))
    }

    /// Score a batch atomically: any invalid row rejects the whole batch,
    /// with the row index and field named. Rows are transformed and scored
    /// as one matrix.
    pub fn predict_batch(&self, raws: &[ChurnFeatures]) -> AppResult<Vec<Prediction>> {
        for (index, raw) in raws.iter().enumerate() {
            raw.validate().map_err(|e| match e {
                AppError::Validation(msg) => AppError::Validation(format!("row {index}: {msg}")),
                other => other,
            })?;
        }
        if raws.is_empty() {
            return Ok(Vec::new());
        }
        self.score_validated(raws)
    }

    fn score_validated(&self, raws: &[ChurnFeatures]) -> AppResult<Vec<Prediction>> {
        let artifacts = self.artifacts()?;
        let matrix = artifacts.preprocessor.transform(raws)?;
        let probabilities = artifacts.model.predict_proba(matrix.view())?;
        let threshold = artifacts.metadata.business_threshold;

        Ok(raws
            .iter()
            .zip(probabilities)
            .map(|(raw, probability)| {
                let tier = self.risk_bands.classify(probability);
                Prediction {
                    churn_probability: probability,
                    churn_label: u8::from(probability >= threshold),
                    threshold,
                    risk_level: tier.label.clone(),
                    recommendation: self
                        .recommendations
                        .lookup(&raw.rfms_segment, &tier.action_bucket)
                        .to_string(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskProfile;
    use crate::schema::sample_features;
    use std::path::PathBuf;

    fn fixture_config() -> Config {
        Config {
            artifact_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"),
            ..Config::default()
        }
    }

    fn ready_service() -> ChurnService {
        let service = ChurnService::load(&fixture_config(), RecommendationTable::default_policy());
        assert!(service.is_ready());
        service
    }

    #[test]
    fn test_scenario_prediction() {
        let service = ready_service();
        let prediction = service.predict_one(&sample_features()).unwrap();

        // Fixture model: recency 30 lands in the 0.2 leaf, below the 0.35
        // business threshold.
        assert!((0.0..=1.0).contains(&prediction.churn_probability));
        assert!((prediction.churn_probability - 0.2).abs() < 1e-12);
        assert_eq!(prediction.churn_label, 0);
        assert_eq!(prediction.threshold, 0.35);
        assert_eq!(prediction.risk_level, "Low");
        assert_eq!(
            prediction.recommendation,
            "Maintain loyalty: points, referrals, cross-sell"
        );
    }

    #[test]
    fn test_label_tracks_threshold() {
        let service = ready_service();
        let mut features = sample_features();
        features.recency = 200.0;
        let prediction = service.predict_one(&features).unwrap();
        assert!((prediction.churn_probability - 0.9).abs() < 1e-12);
        assert_eq!(prediction.churn_label, 1);
        assert_eq!(prediction.risk_level, "Critical");
        assert_eq!(
            prediction.recommendation,
            "VIP win-back: credit + recovery + feedback"
        );
    }

    #[test]
    fn test_predict_one_is_idempotent() {
        let service = ready_service();
        let first = service.predict_one(&sample_features()).unwrap();
        let second = service.predict_one(&sample_features()).unwrap();
        assert_eq!(first.churn_probability, second.churn_probability);
        assert_eq!(first.churn_label, second.churn_label);
        assert_eq!(first.risk_level, second.risk_level);
        assert_eq!(first.recommendation, second.recommendation);
    }

    #[test]
    fn test_validation_rejected_before_scoring() {
        let service = ready_service();
        let mut features = sample_features();
        features.avg_tip = -0.5;
        let err = service.predict_one(&features).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("avg_tip"));
    }

    #[test]
    fn test_batch_is_atomic_on_bad_row() {
        let service = ready_service();
        let mut bad = sample_features();
        bad.city = "Atlantis".to_string();
        let rows = vec![sample_features(), bad, sample_features()];
        let err = service.predict_batch(&rows).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("row 1"));
                assert!(msg.contains("city"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_scores_all_rows() {
        let service = ready_service();
        let mut churny = sample_features();
        churny.recency = 90.0;
        let predictions = service
            .predict_batch(&[sample_features(), churny])
            .unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].churn_label, 0);
        assert_eq!(predictions[1].churn_label, 1);
    }

    #[test]
    fn test_empty_batch() {
        let service = ready_service();
        assert!(service.predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_artifacts_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            artifact_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let service = ChurnService::load(&config, RecommendationTable::default_policy());
        assert!(!service.is_ready());

        let err = service.predict_one(&sample_features()).unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
        assert!(service.threshold().is_err());
        assert!(service.feature_count().is_err());
    }

    #[test]
    fn test_drifted_metadata_is_unavailable() {
        // Copy fixtures but truncate feature_columns: widths no longer agree.
        let dir = tempfile::tempdir().unwrap();
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        for name in ["preprocessor.json", "churn_model.json"] {
            std::fs::copy(fixtures.join(name), dir.path().join(name)).unwrap();
        }
        std::fs::write(
            dir.path().join("churn_model_metadata.json"),
            r#"{"business_threshold": 0.35, "feature_columns": ["recency"]}"#,
        )
        .unwrap();

        let config = Config {
            artifact_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let service = ChurnService::load(&config, RecommendationTable::default_policy());
        assert!(!service.is_ready());
        let err = service.predict_one(&sample_features()).unwrap_err();
        assert!(err.to_string().contains("SchemaMismatch"));
    }

    #[test]
    fn test_three_tier_profile_labels() {
        let config = Config {
            risk_profile: RiskProfile::ThreeTier,
            ..fixture_config()
        };
        let service = ChurnService::load(&config, RecommendationTable::default_policy());
        let prediction = service.predict_one(&sample_features()).unwrap();
        // 0.2 is below the 0.35 business threshold cut.
        assert_eq!(prediction.risk_level, "Low Risk");

        let mut features = sample_features();
        features.recency = 90.0;
        let prediction = service.predict_one(&features).unwrap();
        // 0.9 is above the 0.65 middle cut.
        assert_eq!(prediction.risk_level, "High Risk");
    }
}
