//! RideWise Churn Prediction API server

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ridewise_churn::config::Config;
use ridewise_churn::recommend::RecommendationTable;
use ridewise_churn::service::ChurnService;
use ridewise_churn::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ridewise_churn=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("RideWise churn service starting...");
    tracing::info!("Artifacts: {}", config.artifact_dir.display());

    // Load model artifacts. A failed load keeps the process up: /health
    // reports model_loaded=false and prediction endpoints return 503.
    let service = ChurnService::load(&config, RecommendationTable::default_policy());
    if !service.is_ready() {
        tracing::warn!("model artifacts unavailable; prediction endpoints will return 503");
    }

    let state = AppState {
        service: Arc::new(service),
        config: config.clone(),
    };
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
