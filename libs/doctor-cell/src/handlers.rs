use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use review_cell::models::ReviewError;
use review_cell::services::ReviewService;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorError, DoctorSearchQuery};
use crate::services::DoctorService;

fn map_doctor_error(err: DoctorError) -> AppError {
    match err {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::Store(e) => e.into(),
    }
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);
    let result = service
        .search_doctors(query)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "doctors": result.items,
        "total": result.total,
        "page": page,
        "limit": limit,
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service
        .get_doctor(doctor_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let specialties = service
        .list_specialties()
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({ "specialties": specialties })))
}

/// Rating summary computed from the reviews collection. The doctor record
/// itself carries no denormalized rating, so this is always fresh.
#[axum::debug_handler]
pub async fn get_doctor_rating(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    // Confirm the doctor exists so an unknown id is a 404, not an empty summary.
    DoctorService::new(&config)
        .get_doctor(doctor_id)
        .await
        .map_err(map_doctor_error)?;

    let summary = ReviewService::new(&config)
        .doctor_summary(doctor_id)
        .await
        .map_err(|e| match e {
            ReviewError::Store(store_err) => store_err.into(),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(json!(summary)))
}
