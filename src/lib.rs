//! RideWise Churn Prediction Service
//!
//! Loads a fitted preprocessing pipeline, a trained tree-ensemble classifier
//! and a metadata mapping at startup, then serves churn predictions over
//! HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  RIDEWISE CHURN SERVICE                    │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────┐   ┌───────────────────┐  │
//! │  │  API     │   │  Inference    │   │  Artifacts        │  │
//! │  │  (Axum)  │──▶│  Service      │──▶│  preprocessor +   │  │
//! │  │          │   │  (validate →  │   │  model + metadata │  │
//! │  └──────────┘   │   score →     │   │  (read-only)      │  │
//! │                 │   tier →      │   └───────────────────┘  │
//! │                 │   recommend)  │                          │
//! │                 └───────────────┘                          │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod handlers;
pub mod recommend;
pub mod risk;
pub mod schema;
pub mod service;

pub use error::{AppError, AppResult};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<service::ChurnService>,
    pub config: config::Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/info", get(handlers::info::info))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
