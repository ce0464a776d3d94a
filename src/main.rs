mod api;
mod config;
mod storage;

use crate::api::{health_handler, AppState};
use crate::config::AppConfig;
use crate::storage::PatientStore;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Patient Records API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Data Dir: {:?}", config.store.data_dir);
    info!("   - Collection: {}", config.store.collection);
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Open the patient collection
    info!("💾 Opening patient store...");
    let patient_store = Arc::new(PatientStore::open(
        &config.store.data_dir,
        &config.store.collection,
    )?);
    info!("✅ Patient store ready ({} records)", patient_store.count().await);

    // Create application state
    let state = AppState { patient_store };

    // Build router with modular routes
    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(api::patients::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let port = std::env::var("PORT").unwrap_or_else(|_| config.server.port.to_string());
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health                  - Health check");
    info!("   GET    /api/v1/patients         - List all patients");
    info!("   POST   /api/v1/patients         - Create patient");
    info!("   GET    /api/v1/patients/{{id}}    - Get one patient");
    info!("   PUT    /api/v1/patients/{{id}}    - Update patient");
    info!("   DELETE /api/v1/patients/{{id}}    - Delete patient");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
