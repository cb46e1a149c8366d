//! API and model info handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct InfoResponse {
    version: &'static str,
    threshold: f64,
    feature_count: usize,
}

/// Service version plus the model's decision threshold and feature width.
/// 503 until the model is loaded.
pub async fn info(State(state): State<AppState>) -> AppResult<Json<InfoResponse>> {
    Ok(Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION"),
        threshold: state.service.threshold()?,
        feature_count: state.service.feature_count()?,
    }))
}
