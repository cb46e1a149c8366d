//! Raw feature schema - the input contract for churn prediction
//!
//! The field set and its bounds mirror the training data exactly. Change the
//! training features and this file must change with them, together with the
//! fitted preprocessor artifact.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Loyalty tiers, ordered Bronze → Platinum (the ordinal encoder relies on
/// this being a closed set).
pub const LOYALTY_TIERS: &[&str] = &["Bronze", "Silver", "Gold", "Platinum"];

/// RFMS customer segments. Also the row key of the recommendation table.
pub const RFMS_SEGMENTS: &[&str] = &[
    "At Risk",
    "Occasional Riders",
    "Core Loyal Riders",
    "High-Value Surge-Tolerant",
];

/// Operating cities (one-hot encoded).
pub const CITIES: &[&str] = &["Cairo", "Lagos", "Nairobi"];

/// Raw rider features for a single prediction request.
///
/// Created per request, immutable, never persisted. Missing fields are
/// rejected by serde at deserialization; value constraints are checked by
/// [`ChurnFeatures::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnFeatures {
    /// Days since last trip
    pub recency: f64,
    /// Total number of trips
    pub total_trips: f64,
    /// Average spend per trip
    pub avg_spend: f64,
    /// Total tips given
    pub total_tip: f64,
    /// Average tip per trip
    pub avg_tip: f64,
    /// Average rating given (0-5)
    pub avg_rating_given: f64,
    /// Average trip distance
    pub avg_distance: f64,
    /// Average trip duration (minutes)
    pub avg_duration: f64,
    /// Bronze | Silver | Gold | Platinum
    pub loyalty_status: String,
    /// At Risk | Occasional Riders | Core Loyal Riders | High-Value Surge-Tolerant
    #[serde(rename = "RFMS_segment")]
    pub rfms_segment: String,
    /// Cairo | Lagos | Nairobi
    pub city: String,
}

impl ChurnFeatures {
    /// Numeric fields in raw declaration order, paired with their names.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("recency", self.recency),
            ("total_trips", self.total_trips),
            ("avg_spend", self.avg_spend),
            ("total_tip", self.total_tip),
            ("avg_tip", self.avg_tip),
            ("avg_rating_given", self.avg_rating_given),
            ("avg_distance", self.avg_distance),
            ("avg_duration", self.avg_duration),
        ]
    }

    /// Look up a numeric raw feature by name.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.numeric_fields()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Look up a categorical raw feature by name.
    pub fn categorical(&self, name: &str) -> Option<&str> {
        match name {
            "loyalty_status" => Some(&self.loyalty_status),
            "RFMS_segment" => Some(&self.rfms_segment),
            "city" => Some(&self.city),
            _ => None,
        }
    }

    /// Validate bounds and categorical domains. Pure check: no side effects,
    /// fails with the offending field named.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(AppError::Validation(format!(
                    "{name} must be a finite number"
                )));
            }
            if value < 0.0 {
                return Err(AppError::Validation(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }
        if self.avg_rating_given > 5.0 {
            return Err(AppError::Validation(format!(
                "avg_rating_given must be between 0 and 5, got {}",
                self.avg_rating_given
            )));
        }
        if !LOYALTY_TIERS.contains(&self.loyalty_status.as_str()) {
            return Err(AppError::Validation(format!(
                "loyalty_status must be one of {LOYALTY_TIERS:?}, got {:?}",
                self.loyalty_status
            )));
        }
        if !RFMS_SEGMENTS.contains(&self.rfms_segment.as_str()) {
            return Err(AppError::Validation(format!(
                "RFMS_segment must be one of {RFMS_SEGMENTS:?}, got {:?}",
                self.rfms_segment
            )));
        }
        if !CITIES.contains(&self.city.as_str()) {
            return Err(AppError::Validation(format!(
                "city must be one of {CITIES:?}, got {:?}",
                self.city
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_features() -> ChurnFeatures {
    ChurnFeatures {
        recency: 30.0,
        total_trips: 20.0,
        avg_spend: 15.0,
        total_tip: 3.0,
        avg_tip: 0.15,
        avg_rating_given: 4.0,
        avg_distance: 5.0,
        avg_duration: 18.0,
        loyalty_status: "Gold".to_string(),
        rfms_segment: "Core Loyal Riders".to_string(),
        city: "Lagos".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_features_pass() {
        assert!(sample_features().validate().is_ok());
    }

    #[test]
    fn test_negative_numeric_names_field() {
        let mut features = sample_features();
        features.recency = -1.0;
        let err = features.validate().unwrap_err();
        assert!(err.to_string().contains("recency"));
    }

    #[test]
    fn test_rating_upper_bound() {
        let mut features = sample_features();
        features.avg_rating_given = 5.5;
        let err = features.validate().unwrap_err();
        assert!(err.to_string().contains("avg_rating_given"));
    }

    #[test]
    fn test_unknown_city_rejected() {
        let mut features = sample_features();
        features.city = "Accra".to_string();
        let err = features.validate().unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_unknown_segment_rejected() {
        let mut features = sample_features();
        features.rfms_segment = "VIP".to_string();
        let err = features.validate().unwrap_err();
        assert!(err.to_string().contains("RFMS_segment"));
    }

    #[test]
    fn test_missing_field_names_field() {
        // Serde rejects missing required columns before validation runs.
        let body = r#"{"total_trips": 20, "city": "Lagos"}"#;
        let err = serde_json::from_str::<ChurnFeatures>(body).unwrap_err();
        assert!(err.to_string().contains("recency"));
    }

    #[test]
    fn test_rfms_segment_serde_rename() {
        let json = serde_json::to_value(sample_features()).unwrap();
        assert!(json.get("RFMS_segment").is_some());
        assert!(json.get("rfms_segment").is_none());
    }

    #[test]
    fn test_named_accessors() {
        let features = sample_features();
        assert_eq!(features.numeric("avg_tip"), Some(0.15));
        assert_eq!(features.categorical("city"), Some("Lagos"));
        assert_eq!(features.numeric("loyalty_status"), None);
        assert_eq!(features.categorical("recency"), None);
    }
}
