use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Doctor-authored prescription, linked 1:1 to a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub diagnosis: String,
    pub medicines: Vec<MedicineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineEntry {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u32,
}

/// The form a doctor fills when issuing a prescription. Ids come from the
/// appointment, not from the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionForm {
    pub diagnosis: String,
    pub medicines: Vec<MedicineEntry>,
    pub advice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionRequest {
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub medicines: Vec<MedicineEntry>,
    pub advice: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PrescriptionError {
    #[error("Prescription not found")]
    NotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Prescriptions can only be issued for completed appointments")]
    AppointmentNotCompleted,

    #[error("Appointment already has a prescription")]
    AlreadyIssued,

    #[error(transparent)]
    Store(#[from] StoreError),
}
