use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::{JsonApiClient, ListQuery, SortOrder, StoreError};

use crate::models::{CreatePrescriptionRequest, Prescription, PrescriptionError, PrescriptionForm};

pub struct PrescriptionService {
    store: JsonApiClient,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonApiClient::new(config),
        }
    }

    /// Write the prescription record and link it back onto the appointment
    /// as `prescriptionId`. Callers are responsible for having validated the
    /// appointment's state; the completion flow calls this mid-transition.
    pub async fn issue_for_appointment(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        form: PrescriptionForm,
    ) -> Result<Prescription, PrescriptionError> {
        let prescription_data = json!({
            "id": Uuid::new_v4(),
            "appointmentId": appointment_id,
            "doctorId": doctor_id,
            "patientId": patient_id,
            "diagnosis": form.diagnosis,
            "medicines": form.medicines,
            "advice": form.advice,
            "createdAt": Utc::now(),
        });

        let prescription: Prescription =
            self.store.create("prescriptions", prescription_data).await?;

        self.store
            .patch::<Value>(
                "appointments",
                &appointment_id.to_string(),
                json!({ "prescriptionId": prescription.id, "updatedAt": Utc::now() }),
            )
            .await?;

        debug!(
            "Prescription {} issued for appointment {}",
            prescription.id, appointment_id
        );

        Ok(prescription)
    }

    /// Standalone create, for a completed appointment that was closed
    /// without one. Validates status and the 1:1 link before writing.
    pub async fn create_prescription(
        &self,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        let appointment: Value = self
            .store
            .get_one("appointments", &request.appointment_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => PrescriptionError::AppointmentNotFound,
                other => PrescriptionError::Store(other),
            })?;

        if appointment["status"].as_str() != Some("completed") {
            return Err(PrescriptionError::AppointmentNotCompleted);
        }

        if !appointment["prescriptionId"].is_null() {
            return Err(PrescriptionError::AlreadyIssued);
        }

        let doctor_id = parse_id_field(&appointment, "doctorId")?;
        let patient_id = parse_id_field(&appointment, "patientId")?;

        self.issue_for_appointment(
            request.appointment_id,
            doctor_id,
            patient_id,
            PrescriptionForm {
                diagnosis: request.diagnosis,
                medicines: request.medicines,
                advice: request.advice,
            },
        )
        .await
    }

    pub async fn get_prescription(
        &self,
        prescription_id: Uuid,
    ) -> Result<Prescription, PrescriptionError> {
        self.store
            .get_one("prescriptions", &prescription_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => PrescriptionError::NotFound,
                other => PrescriptionError::Store(other),
            })
    }

    pub async fn get_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Prescription, PrescriptionError> {
        let matches: Vec<Prescription> = self
            .store
            .find(
                "prescriptions",
                &ListQuery::new().filter("appointmentId", appointment_id),
            )
            .await?;

        matches.into_iter().next().ok_or(PrescriptionError::NotFound)
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Prescription>, PrescriptionError> {
        let prescriptions = self
            .store
            .find(
                "prescriptions",
                &ListQuery::new()
                    .filter("patientId", patient_id)
                    .sort("createdAt", SortOrder::Desc),
            )
            .await?;

        Ok(prescriptions)
    }
}

fn parse_id_field(record: &Value, field: &str) -> Result<Uuid, PrescriptionError> {
    record[field]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| {
            PrescriptionError::Store(StoreError::Decode(format!(
                "appointment record has no valid {}",
                field
            )))
        })
}
