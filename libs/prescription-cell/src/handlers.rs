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

use crate::models::{CreatePrescriptionRequest, PrescriptionError};
use crate::services::PrescriptionService;

fn map_prescription_error(err: PrescriptionError) -> AppError {
    match err {
        PrescriptionError::NotFound => AppError::NotFound("Prescription not found".to_string()),
        PrescriptionError::AppointmentNotFound => {
            AppError::NotFound("Appointment not found".to_string())
        }
        PrescriptionError::AppointmentNotCompleted => AppError::Conflict(
            "Prescriptions can only be issued for completed appointments".to_string(),
        ),
        PrescriptionError::AlreadyIssued => {
            AppError::Conflict("Appointment already has a prescription".to_string())
        }
        PrescriptionError::Store(e) => e.into(),
    }
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .create_prescription(request)
        .await
        .map_err(map_prescription_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "prescription": prescription,
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(config): State<Arc<AppConfig>>,
    Path(prescription_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .get_prescription(prescription_id)
        .await
        .map_err(map_prescription_error)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn get_appointment_prescription(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .get_for_appointment(appointment_id)
        .await
        .map_err(map_prescription_error)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn get_patient_prescriptions(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescriptions = service
        .list_for_patient(patient_id)
        .await
        .map_err(map_prescription_error)?;

    Ok(Json(json!({
        "prescriptions": prescriptions,
        "total": prescriptions.len(),
    })))
}
