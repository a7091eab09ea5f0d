use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::{JsonApiClient, ListQuery, SortOrder, StoreError};

use crate::models::{
    CreateReviewRequest, RatingSummary, ReplyToReviewRequest, Review, ReviewError,
    UpdateReviewRequest,
};
use crate::services::window;

pub struct ReviewService {
    store: JsonApiClient,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonApiClient::new(config),
        }
    }

    /// Create a review for a completed appointment. The doctor is taken from
    /// the appointment record, so a review can never point at a doctor the
    /// patient did not actually see.
    pub async fn create_review(&self, request: CreateReviewRequest) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating);
        }

        let appointment: Value = self
            .store
            .get_one("appointments", &request.appointment_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ReviewError::AppointmentNotFound,
                other => ReviewError::Store(other),
            })?;

        if appointment["status"].as_str() != Some("completed") {
            return Err(ReviewError::AppointmentNotCompleted);
        }

        if appointment["patientId"].as_str() != Some(request.patient_id.to_string().as_str()) {
            return Err(ReviewError::NotAppointmentPatient);
        }

        let doctor_id = appointment["doctorId"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                ReviewError::Store(StoreError::Decode(
                    "appointment record has no doctorId".to_string(),
                ))
            })?;

        let existing: Vec<Review> = self
            .store
            .find(
                "reviews",
                &ListQuery::new().filter("appointmentId", request.appointment_id),
            )
            .await?;

        if !existing.is_empty() {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review_data = json!({
            "id": Uuid::new_v4(),
            "doctorId": doctor_id,
            "patientId": request.patient_id,
            "appointmentId": request.appointment_id,
            "rating": request.rating,
            "comment": request.comment,
            "createdAt": Utc::now(),
        });

        let review: Review = self.store.create("reviews", review_data).await?;
        debug!("Review {} created for appointment {}", review.id, request.appointment_id);

        Ok(review)
    }

    pub async fn get_review(&self, review_id: Uuid) -> Result<Review, ReviewError> {
        self.store
            .get_one("reviews", &review_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ReviewError::NotFound,
                other => ReviewError::Store(other),
            })
    }

    /// Edit rating/comment. Rejected once the 24 hour window since creation
    /// has passed; the window is checked here, against the store's record,
    /// not in any client.
    pub async fn update_review(
        &self,
        review_id: Uuid,
        request: UpdateReviewRequest,
    ) -> Result<Review, ReviewError> {
        let review = self.get_review(review_id).await?;

        if !window::within_edit_window(review.created_at, Utc::now()) {
            return Err(ReviewError::EditWindowExpired);
        }

        if let Some(rating) = request.rating {
            if !(1..=5).contains(&rating) {
                return Err(ReviewError::InvalidRating);
            }
        }

        let mut update_data = serde_json::Map::new();
        if let Some(rating) = request.rating {
            update_data.insert("rating".to_string(), json!(rating));
        }
        if let Some(comment) = request.comment {
            update_data.insert("comment".to_string(), json!(comment));
        }
        update_data.insert("updatedAt".to_string(), json!(Utc::now()));

        let updated: Review = self
            .store
            .patch("reviews", &review_id.to_string(), Value::Object(update_data))
            .await?;

        Ok(updated)
    }

    pub async fn delete_review(&self, review_id: Uuid) -> Result<(), ReviewError> {
        let review = self.get_review(review_id).await?;

        if !window::within_edit_window(review.created_at, Utc::now()) {
            return Err(ReviewError::EditWindowExpired);
        }

        self.store.delete("reviews", &review_id.to_string()).await?;
        debug!("Review {} deleted", review_id);

        Ok(())
    }

    /// Doctor-side reply. Replies are not bound to the patient edit window.
    pub async fn reply_to_review(
        &self,
        review_id: Uuid,
        request: ReplyToReviewRequest,
    ) -> Result<Review, ReviewError> {
        self.get_review(review_id).await?;

        let updated: Review = self
            .store
            .patch(
                "reviews",
                &review_id.to_string(),
                json!({ "doctorReply": request.reply, "updatedAt": Utc::now() }),
            )
            .await?;

        Ok(updated)
    }

    pub async fn doctor_reviews(&self, doctor_id: Uuid) -> Result<Vec<Review>, ReviewError> {
        let reviews = self
            .store
            .find(
                "reviews",
                &ListQuery::new()
                    .filter("doctorId", doctor_id)
                    .sort("createdAt", SortOrder::Desc),
            )
            .await?;

        Ok(reviews)
    }

    pub async fn doctor_summary(&self, doctor_id: Uuid) -> Result<RatingSummary, ReviewError> {
        let reviews: Vec<Review> = self
            .store
            .find("reviews", &ListQuery::new().filter("doctorId", doctor_id))
            .await?;

        let review_count = reviews.len() as u64;
        let average_rating = if reviews.is_empty() {
            None
        } else {
            let sum: u64 = reviews.iter().map(|r| r.rating as u64).sum();
            Some(sum as f64 / review_count as f64)
        };

        Ok(RatingSummary {
            doctor_id,
            average_rating,
            review_count,
        })
    }
}
