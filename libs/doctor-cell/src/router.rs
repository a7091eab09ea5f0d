use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::search_doctors))
        .route("/specialties", get(handlers::list_specialties))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/rating", get(handlers::get_doctor_rating))
        .with_state(state)
}
