//! Retention recommendation policy
//!
//! A fixed (RFMS segment × risk bucket) lookup. This is business policy, not
//! statistics: the table is data injected at service construction, and the
//! mapping is pure and deterministic.

use std::collections::HashMap;

/// Returned when no rule covers a (segment, bucket) combination.
pub const DEFAULT_RECOMMENDATION: &str = "No action rule defined";

#[derive(Debug, Clone)]
pub struct RecommendationTable {
    rules: HashMap<(String, String), String>,
    fallback: String,
}

impl RecommendationTable {
    /// Build a table from explicit rules.
    pub fn from_rules<I>(rules: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str, &'static str)>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(segment, bucket, action)| {
                    ((segment.to_string(), bucket.to_string()), action.to_string())
                })
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    /// The retention playbook agreed with the business side.
    pub fn default_policy() -> Self {
        Self::from_rules(
            [
                (
                    "At Risk",
                    "High Risk",
                    "Highest-priority churn-prevention (credits + surge relief + recovery)",
                ),
                ("At Risk", "Medium Risk", "Off-peak discount + surge education"),
                ("At Risk", "Low Risk", "Monitor: low-cost reminders, reduce friction"),
                (
                    "Core Loyal Riders",
                    "High Risk",
                    "VIP win-back: credit + recovery + feedback",
                ),
                (
                    "Core Loyal Riders",
                    "Medium Risk",
                    "Loyalty reinforcement: bonus points + reminder",
                ),
                (
                    "Core Loyal Riders",
                    "Low Risk",
                    "Maintain loyalty: points, referrals, cross-sell",
                ),
                ("Occasional Riders", "High Risk", "Reactivation: limited-time discount"),
                ("Occasional Riders", "Medium Risk", "Activation: time-limited offer"),
                (
                    "Occasional Riders",
                    "Low Risk",
                    "Engagement nudges: seasonal campaigns",
                ),
                (
                    "High-Value Surge-Tolerant",
                    "High Risk",
                    "White-glove retention: personalized outreach",
                ),
                (
                    "High-Value Surge-Tolerant",
                    "Medium Risk",
                    "Recognition: perks, no discounts",
                ),
                (
                    "High-Value Surge-Tolerant",
                    "Low Risk",
                    "Reward/recognition: perks, priority support",
                ),
            ],
            DEFAULT_RECOMMENDATION,
        )
    }

    /// Look up the action for a segment and risk bucket.
    pub fn lookup(&self, segment: &str, bucket: &str) -> &str {
        self.rules
            .get(&(segment.to_string(), bucket.to_string()))
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RFMS_SEGMENTS;

    #[test]
    fn test_known_cells() {
        let table = RecommendationTable::default_policy();
        assert_eq!(
            table.lookup("At Risk", "High Risk"),
            "Highest-priority churn-prevention (credits + surge relief + recovery)"
        );
        assert_eq!(
            table.lookup("Core Loyal Riders", "Low Risk"),
            "Maintain loyalty: points, referrals, cross-sell"
        );
        assert_eq!(
            table.lookup("High-Value Surge-Tolerant", "Medium Risk"),
            "Recognition: perks, no discounts"
        );
    }

    #[test]
    fn test_unknown_combination_falls_back() {
        let table = RecommendationTable::default_policy();
        assert_eq!(table.lookup("At Risk", "Critical"), DEFAULT_RECOMMENDATION);
        assert_eq!(table.lookup("Commuters", "High Risk"), DEFAULT_RECOMMENDATION);
    }

    #[test]
    fn test_every_segment_covered_for_all_buckets() {
        let table = RecommendationTable::default_policy();
        for segment in RFMS_SEGMENTS {
            for bucket in ["Low Risk", "Medium Risk", "High Risk"] {
                assert_ne!(table.lookup(segment, bucket), DEFAULT_RECOMMENDATION);
            }
        }
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let table = RecommendationTable::default_policy();
        let first = table.lookup("Occasional Riders", "Medium Risk").to_string();
        let second = table.lookup("Occasional Riders", "Medium Risk").to_string();
        assert_eq!(first, second);
    }
}
