use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/register", post(handlers::register_patient))
        .route("/login", post(handlers::login_patient))
        .route("/{patient_id}", get(handlers::get_patient))
        .route("/{patient_id}", patch(handlers::update_patient))
        .with_state(state)
}
