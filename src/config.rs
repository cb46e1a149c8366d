//! Configuration module

use std::env;
use std::path::PathBuf;

/// Risk tiering profile. Cut points are configuration, not constants; the
/// two profiles below reflect the schemes used by the business side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskProfile {
    /// Low / Medium / High / Critical at 0.25 / 0.5 / 0.75.
    FourTier,
    /// Low Risk / Medium Risk / High Risk at business threshold / RISK_MID.
    ThreeTier,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding preprocessor, model and metadata artifacts
    pub artifact_dir: PathBuf,

    /// Server port
    pub port: u16,

    /// Risk tiering profile
    pub risk_profile: RiskProfile,

    /// Middle cut point for the three-tier profile
    pub risk_mid: f64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            artifact_dir: env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model")),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            risk_profile: match env::var("RISK_PROFILE").as_deref() {
                Ok("three-tier") => RiskProfile::ThreeTier,
                _ => RiskProfile::FourTier,
            },

            risk_mid: env::var("RISK_MID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.65),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("model"),
            port: 8000,
            risk_profile: RiskProfile::FourTier,
            risk_mid: 0.65,
            environment: "development".to_string(),
        }
    }
}
