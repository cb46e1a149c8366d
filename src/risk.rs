//! Risk tier configuration
//!
//! Buckets a churn probability into ordinal tiers for human-facing reporting.
//! Cut points are data held by [`RiskBands`], never constants in the scoring
//! path, so the tiering scheme can change per deployment profile.

use serde::{Deserialize, Serialize};

use crate::config::{Config, RiskProfile};

/// One tier of the scheme: its display label and the recommendation-table
/// column it maps to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTier {
    pub label: String,
    pub action_bucket: String,
}

impl RiskTier {
    fn new(label: &str, action_bucket: &str) -> Self {
        Self {
            label: label.to_string(),
            action_bucket: action_bucket.to_string(),
        }
    }
}

/// Ordered risk cut points. Boundaries are closed-open upward: a probability
/// exactly at a cut belongs to the tier above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBands {
    /// (upper cut, tier) pairs in ascending cut order.
    cuts: Vec<(f64, RiskTier)>,
    /// Tier for probabilities at or above the last cut.
    top: RiskTier,
}

impl RiskBands {
    /// Low / Medium / High / Critical at 0.25 / 0.5 / 0.75. Critical shares
    /// the High Risk action bucket of the recommendation table.
    pub fn four_tier() -> Self {
        Self {
            cuts: vec![
                (0.25, RiskTier::new("Low", "Low Risk")),
                (0.5, RiskTier::new("Medium", "Medium Risk")),
                (0.75, RiskTier::new("High", "High Risk")),
            ],
            top: RiskTier::new("Critical", "High Risk"),
        }
    }

    /// Low Risk / Medium Risk / High Risk keyed off the business threshold
    /// and a configurable middle cut.
    pub fn three_tier(threshold: f64, mid: f64) -> Self {
        Self {
            cuts: vec![
                (threshold, RiskTier::new("Low Risk", "Low Risk")),
                (mid, RiskTier::new("Medium Risk", "Medium Risk")),
            ],
            top: RiskTier::new("High Risk", "High Risk"),
        }
    }

    /// Build the profile selected by configuration.
    pub fn from_profile(config: &Config, business_threshold: f64) -> Self {
        match config.risk_profile {
            RiskProfile::FourTier => Self::four_tier(),
            RiskProfile::ThreeTier => Self::three_tier(business_threshold, config.risk_mid),
        }
    }

    /// Classify a probability into its tier.
    pub fn classify(&self, probability: f64) -> &RiskTier {
        for (upper, tier) in &self.cuts {
            if probability < *upper {
                return tier;
            }
        }
        &self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_tier_labels() {
        let bands = RiskBands::four_tier();
        assert_eq!(bands.classify(0.1).label, "Low");
        assert_eq!(bands.classify(0.3).label, "Medium");
        assert_eq!(bands.classify(0.6).label, "High");
        assert_eq!(bands.classify(0.9).label, "Critical");
    }

    #[test]
    fn test_cut_point_goes_to_higher_tier() {
        let bands = RiskBands::four_tier();
        assert_eq!(bands.classify(0.25).label, "Medium");
        assert_eq!(bands.classify(0.5).label, "High");
        assert_eq!(bands.classify(0.75).label, "Critical");
        assert_eq!(bands.classify(1.0).label, "Critical");
        assert_eq!(bands.classify(0.0).label, "Low");
    }

    #[test]
    fn test_critical_shares_high_risk_bucket() {
        let bands = RiskBands::four_tier();
        assert_eq!(bands.classify(0.9).action_bucket, "High Risk");
        assert_eq!(bands.classify(0.6).action_bucket, "High Risk");
    }

    #[test]
    fn test_three_tier_profile() {
        let bands = RiskBands::three_tier(0.35, 0.65);
        assert_eq!(bands.classify(0.2).label, "Low Risk");
        assert_eq!(bands.classify(0.35).label, "Medium Risk");
        assert_eq!(bands.classify(0.64).label, "Medium Risk");
        assert_eq!(bands.classify(0.65).label, "High Risk");
    }
}
