use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, BookAppointmentRequest, CancelAppointmentRequest,
    CompleteAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::services::AppointmentBookingService;

fn map_appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::InvalidTime(msg) => AppError::BadRequest(msg),
        AppointmentError::InvalidStatusTransition { from, to } => {
            AppError::Conflict(format!("Appointment cannot move from {} to {}", from, to))
        }
        AppointmentError::AlreadyPrescribed => {
            AppError::Conflict("Appointment already has a prescription".to_string())
        }
        AppointmentError::Prescription(msg) => AppError::Conflict(msg),
        AppointmentError::Store(e) => e.into(),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .book_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully",
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let result = service
        .search_appointments(query)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": result.items,
        "total": result.total,
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .confirm_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .cancel_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled",
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled, awaiting confirmation",
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let (appointment, prescription) = service
        .complete_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "prescription": prescription,
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointments = service
        .patient_appointments(patient_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointments = service
        .doctor_appointments(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}
