pub mod models;
pub mod patients;

// Re-exports
pub use models::*;

// Health handler (simple, keep here)
use axum::{extract::State, Json};

pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let total_patients = state.patient_store.count().await;
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_patients,
    })
}
