use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use doctor_cell::services::DoctorService;
use prescription_cell::models::{Prescription, PrescriptionError};
use prescription_cell::services::PrescriptionService;
use shared_config::AppConfig;
use shared_store::{JsonApiClient, ListQuery, Page, SortOrder, StoreError};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    store: JsonApiClient,
    lifecycle: AppointmentLifecycleService,
    doctors: DoctorService,
    prescriptions: PrescriptionService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonApiClient::new(config),
            lifecycle: AppointmentLifecycleService::new(),
            doctors: DoctorService::new(config),
            prescriptions: PrescriptionService::new(config),
        }
    }

    /// Book an appointment. The fee is copied from the doctor's current
    /// profile at booking time and never recomputed afterwards. A valid
    /// booking is immediately `confirmed`.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        self.lifecycle
            .validate_slot(request.date, request.time, Utc::now().naive_utc())?;

        self.verify_patient_exists(request.patient_id).await?;

        let doctor = self
            .doctors
            .get_doctor(request.doctor_id)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                DoctorError::Store(store_err) => AppointmentError::Store(store_err),
            })?;

        let now = Utc::now();
        let appointment_data = json!({
            "id": Uuid::new_v4(),
            "doctorId": request.doctor_id,
            "patientId": request.patient_id,
            "date": request.date,
            "time": request.time,
            "status": AppointmentStatus::Confirmed,
            "consultationType": request.consultation_type,
            "fee": doctor.fee,
            "createdAt": now,
            "updatedAt": now,
        });

        let appointment: Appointment = self.store.create("appointments", appointment_data).await?;
        info!("Appointment {} booked", appointment.id);

        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .get_one("appointments", &appointment_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AppointmentError::NotFound,
                other => AppointmentError::Store(other),
            })
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Page<Appointment>, AppointmentError> {
        let mut list_query = ListQuery::new()
            .page(query.page.unwrap_or(1))
            .limit(query.limit.unwrap_or(10))
            .sort("date", SortOrder::Desc);

        if let Some(patient_id) = query.patient_id {
            list_query = list_query.filter("patientId", patient_id);
        }
        if let Some(doctor_id) = query.doctor_id {
            list_query = list_query.filter("doctorId", doctor_id);
        }
        if let Some(status) = query.status {
            list_query = list_query.filter("status", status);
        }

        let page = self.store.find_page("appointments", &list_query).await?;
        Ok(page)
    }

    pub async fn patient_appointments(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self
            .store
            .find(
                "appointments",
                &ListQuery::new()
                    .filter("patientId", patient_id)
                    .sort("date", SortOrder::Desc),
            )
            .await?;

        Ok(appointments)
    }

    pub async fn doctor_appointments(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self
            .store
            .find(
                "appointments",
                &ListQuery::new()
                    .filter("doctorId", doctor_id)
                    .sort("date", SortOrder::Desc),
            )
            .await?;

        Ok(appointments)
    }

    /// Doctor-side confirmation of a pending (rescheduled) appointment.
    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Confirmed)?;

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Confirmed,
                    "updatedAt": Utc::now(),
                }),
            )
            .await?;

        info!("Appointment {} confirmed", appointment_id);
        Ok(updated)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let mut patch = json!({
            "status": AppointmentStatus::Cancelled,
            "cancelReason": request.reason,
            "updatedAt": Utc::now(),
        });
        if let Some(cancelled_by) = request.cancelled_by {
            patch["cancelledBy"] = json!(cancelled_by);
        }

        let updated = self.patch_appointment(appointment_id, patch).await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(updated)
    }

    /// Move an appointment to a new slot. The appointment drops back to
    /// `pending` so the doctor has to confirm the new time.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if !self.lifecycle.can_reschedule(appointment.status) {
            return Err(AppointmentError::InvalidStatusTransition {
                from: appointment.status,
                to: AppointmentStatus::Pending,
            });
        }

        self.lifecycle
            .validate_slot(request.date, request.time, Utc::now().naive_utc())?;

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "date": request.date,
                    "time": request.time,
                    "status": AppointmentStatus::Pending,
                    "updatedAt": Utc::now(),
                }),
            )
            .await?;

        info!(
            "Appointment {} rescheduled to {} {}",
            appointment_id, request.date, request.time
        );
        Ok(updated)
    }

    /// Complete a consultation, optionally issuing a prescription in the
    /// same request. The prescription is written and linked before the
    /// status flips, so a `completed` appointment never briefly points at
    /// a missing prescription.
    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        request: CompleteAppointmentRequest,
    ) -> Result<(Appointment, Option<Prescription>), AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Completed)?;

        let prescription = match request.prescription {
            Some(form) => {
                if appointment.prescription_id.is_some() {
                    return Err(AppointmentError::AlreadyPrescribed);
                }

                let prescription = self
                    .prescriptions
                    .issue_for_appointment(
                        appointment_id,
                        appointment.doctor_id,
                        appointment.patient_id,
                        form,
                    )
                    .await
                    .map_err(|e| match e {
                        PrescriptionError::Store(store_err) => AppointmentError::Store(store_err),
                        other => AppointmentError::Prescription(other.to_string()),
                    })?;

                Some(prescription)
            }
            None => None,
        };

        let updated = self
            .patch_appointment(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Completed,
                    "updatedAt": Utc::now(),
                }),
            )
            .await?;

        info!(
            "Appointment {} completed{}",
            appointment_id,
            if prescription.is_some() {
                " with prescription"
            } else {
                ""
            }
        );

        Ok((updated, prescription))
    }

    async fn verify_patient_exists(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        self.store
            .get_one::<Value>("patients", &patient_id.to_string())
            .await
            .map(|_| ())
            .map_err(|e| match e {
                StoreError::NotFound(_) => AppointmentError::PatientNotFound,
                other => AppointmentError::Store(other),
            })
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        body: Value,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Patching appointment {}: {}", appointment_id, body);

        let updated = self
            .store
            .patch("appointments", &appointment_id.to_string(), body)
            .await?;

        Ok(updated)
    }
}
