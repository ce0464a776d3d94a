use crate::api::models::AppState;
use crate::api::patients::handlers::{
    create_patient_handler, delete_patient_handler, get_patient_handler, list_patients_handler,
    update_patient_handler,
};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/patients",
            get(list_patients_handler).post(create_patient_handler),
        )
        .route(
            "/api/v1/patients/{id}",
            get(get_patient_handler)
                .put(update_patient_handler)
                .delete(delete_patient_handler),
        )
}
