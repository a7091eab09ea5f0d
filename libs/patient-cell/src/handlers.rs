use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{LoginRequest, PatientError, RegisterPatientRequest, UpdatePatientRequest};
use crate::services::PatientService;

fn map_patient_error(err: PatientError) -> AppError {
    match err {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::EmailTaken(email) => {
            AppError::Conflict(format!("Patient with email {} already exists", email))
        }
        PatientError::InvalidCredentials => {
            AppError::Auth("Invalid email or password".to_string())
        }
        PatientError::Store(e) => e.into(),
    }
}

#[axum::debug_handler]
pub async fn register_patient(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::new(&config);

    let patient = service.register(request).await.map_err(map_patient_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "patient": patient,
        })),
    ))
}

#[axum::debug_handler]
pub async fn login_patient(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.login(request).await.map_err(map_patient_error)?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .get_patient(patient_id)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .update_patient(patient_id, request)
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}
