//! Prediction handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::schema::ChurnFeatures;
use crate::service::Prediction;
use crate::{AppResult, AppState};

/// Predict churn probability, label, risk tier and recommendation for a
/// single rider.
pub async fn predict(
    State(state): State<AppState>,
    Json(features): Json<ChurnFeatures>,
) -> AppResult<Json<Prediction>> {
    let prediction = state.service.predict_one(&features)?;
    tracing::debug!(
        probability = prediction.churn_probability,
        label = prediction.churn_label,
        risk = %prediction.risk_level,
        "prediction served"
    );
    Ok(Json(prediction))
}

#[derive(Serialize)]
pub struct BatchResponse {
    predictions: Vec<Prediction>,
    count: usize,
}

/// Batch predict. Atomic: a single invalid row fails the whole batch.
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(batch): Json<Vec<ChurnFeatures>>,
) -> AppResult<Json<BatchResponse>> {
    let predictions = state.service.predict_batch(&batch)?;
    let count = predictions.len();
    tracing::debug!(count, "batch prediction served");
    Ok(Json(BatchResponse { predictions, count }))
}
