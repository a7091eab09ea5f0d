use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn prescription_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_prescription))
        .route("/{prescription_id}", get(handlers::get_prescription))
        .route(
            "/appointments/{appointment_id}",
            get(handlers::get_appointment_prescription),
        )
        .route(
            "/patients/{patient_id}",
            get(handlers::get_patient_prescriptions),
        )
        .with_state(state)
}
