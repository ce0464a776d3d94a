use crate::api::models::*;
use crate::storage::Patient;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

pub async fn list_patients_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = state.patient_store.list_all().await?;
    Ok(Json(patients))
}

pub async fn get_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state.patient_store.find_by_id(&id).await?;
    Ok(Json(patient))
}

pub async fn create_patient_handler(
    State(state): State<AppState>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let patient = Patient::new(
        request.name,
        request.age,
        request.disease,
        request.description,
    );
    let created = state.patient_store.save(patient).await?;

    info!(id = %created.id, "Patient created");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Full-record replace: id and createdDate carry over from the existing
    // record, everything else comes from the request body.
    let existing = state.patient_store.find_by_id(&id).await?;
    let updated = state
        .patient_store
        .save(Patient {
            id: existing.id,
            name: request.name,
            age: request.age,
            disease: request.disease,
            description: request.description,
            created_date: existing.created_date,
            updated_date: Utc::now(),
        })
        .await?;

    info!(id = %updated.id, "Patient updated");

    Ok(Json(updated))
}

pub async fn delete_patient_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Idempotent: no existence check, deleting an unknown id also returns 204.
    state.patient_store.delete_by_id(&id).await?;

    info!(id = %id, "Patient deleted");

    Ok(StatusCode::NO_CONTENT)
}
