use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Patient-authored rating and feedback for a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
    pub rating: u8,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyToReviewRequest {
    pub reply: String,
}

/// Aggregate of all reviews left for a doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub doctor_id: Uuid,
    pub average_rating: Option<f64>,
    pub review_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Only completed appointments can be reviewed")]
    AppointmentNotCompleted,

    #[error("Appointment belongs to a different patient")]
    NotAppointmentPatient,

    #[error("Appointment has already been reviewed")]
    AlreadyReviewed,

    #[error("Review can no longer be changed: the 24 hour edit window has passed")]
    EditWindowExpired,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error(transparent)]
    Store(#[from] StoreError),
}
