use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn review_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_review))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_reviews))
        .route("/{review_id}", patch(handlers::update_review))
        .route("/{review_id}", delete(handlers::delete_review))
        .route("/{review_id}/reply", post(handlers::reply_to_review))
        .with_state(state)
}
