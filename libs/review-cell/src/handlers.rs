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

use crate::models::{CreateReviewRequest, ReplyToReviewRequest, ReviewError, UpdateReviewRequest};
use crate::services::ReviewService;

fn map_review_error(err: ReviewError) -> AppError {
    match err {
        ReviewError::NotFound => AppError::NotFound("Review not found".to_string()),
        ReviewError::AppointmentNotFound => {
            AppError::NotFound("Appointment not found".to_string())
        }
        ReviewError::AppointmentNotCompleted => {
            AppError::Conflict("Only completed appointments can be reviewed".to_string())
        }
        ReviewError::NotAppointmentPatient => {
            AppError::Forbidden("Appointment belongs to a different patient".to_string())
        }
        ReviewError::AlreadyReviewed => {
            AppError::Conflict("Appointment has already been reviewed".to_string())
        }
        ReviewError::EditWindowExpired => AppError::Forbidden(
            "Review can no longer be changed: the 24 hour edit window has passed".to_string(),
        ),
        ReviewError::InvalidRating => {
            AppError::BadRequest("Rating must be between 1 and 5".to_string())
        }
        ReviewError::Store(e) => e.into(),
    }
}

#[axum::debug_handler]
pub async fn create_review(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = ReviewService::new(&config);

    let review = service
        .create_review(request)
        .await
        .map_err(map_review_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "review": review,
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_doctor_reviews(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);

    let reviews = service
        .doctor_reviews(doctor_id)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "reviews": reviews,
        "total": reviews.len(),
    })))
}

#[axum::debug_handler]
pub async fn update_review(
    State(config): State<Arc<AppConfig>>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);

    let review = service
        .update_review(review_id, request)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!(review)))
}

#[axum::debug_handler]
pub async fn delete_review(
    State(config): State<Arc<AppConfig>>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);

    service
        .delete_review(review_id)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Review deleted",
    })))
}

#[axum::debug_handler]
pub async fn reply_to_review(
    State(config): State<Arc<AppConfig>>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<ReplyToReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);

    let review = service
        .reply_to_review(review_id, request)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!(review)))
}
