// Main entry point - Dependency injection and server setup
use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bike_sharing_dashboard::application::dashboard_service::DashboardService;
use bike_sharing_dashboard::application::dataset_source::DatasetSource;
use bike_sharing_dashboard::infrastructure::config::load_app_config;
use bike_sharing_dashboard::infrastructure::csv_source::CsvDatasetSource;
use bike_sharing_dashboard::presentation::app_state::AppState;
use bike_sharing_dashboard::presentation::handlers::{dataset_info, get_dashboard, get_table, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Load the dataset once; it is shared read-only by every request
    let source = CsvDatasetSource::new(
        app_config.dataset.path.clone(),
        app_config.dataset.strict_schema,
    );
    let dataset = source.load().with_context(|| {
        format!(
            "failed to load dataset from {}",
            app_config.dataset.path.display()
        )
    })?;

    // Create services (application layer)
    let dashboard_service =
        DashboardService::new(Arc::new(dataset), app_config.dashboard.peak_hours);

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dataset", get(dataset_info))
        .route("/dashboard", get(get_dashboard))
        .route("/tables/:name", get(get_table))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = app_config.server.socket_addr()?;
    tracing::info!("Starting bike-sharing-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
