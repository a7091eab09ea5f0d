use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::{JsonApiClient, ListQuery, StoreError};

use crate::models::{
    LoginRequest, Patient, PatientError, PatientProfile, RegisterPatientRequest,
    UpdatePatientRequest,
};

pub struct PatientService {
    store: JsonApiClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonApiClient::new(config),
        }
    }

    /// Register a new patient. Email uniqueness is checked with a filtered
    /// read first, since the store itself enforces nothing.
    pub async fn register(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<PatientProfile, PatientError> {
        debug!("Registering new patient: {}", request.email);

        let existing: Vec<Patient> = self
            .store
            .find("patients", &ListQuery::new().filter("email", &request.email))
            .await?;

        if !existing.is_empty() {
            return Err(PatientError::EmailTaken(request.email));
        }

        let patient_data = json!({
            "id": Uuid::new_v4(),
            "name": request.name,
            "email": request.email,
            "password": request.password,
            "phone": request.phone,
            "dateOfBirth": request.date_of_birth,
            "gender": request.gender,
            "address": request.address,
            "createdAt": Utc::now(),
        });

        let patient: Patient = self.store.create("patients", patient_data).await?;
        debug!("Patient registered with ID: {}", patient.id);

        Ok(patient.into())
    }

    /// Demo login: fetch the patient by email and compare passwords in
    /// plaintext. This mirrors the original application and is not a
    /// security mechanism.
    pub async fn login(&self, request: LoginRequest) -> Result<PatientProfile, PatientError> {
        debug!("Login attempt for: {}", request.email);

        let matches: Vec<Patient> = self
            .store
            .find("patients", &ListQuery::new().filter("email", &request.email))
            .await?;

        let patient = matches
            .into_iter()
            .next()
            .ok_or(PatientError::InvalidCredentials)?;

        if patient.password != request.password {
            return Err(PatientError::InvalidCredentials);
        }

        Ok(patient.into())
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<PatientProfile, PatientError> {
        let patient: Patient = self
            .store
            .get_one("patients", &patient_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => PatientError::NotFound,
                other => PatientError::Store(other),
            })?;

        Ok(patient.into())
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<PatientProfile, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        // Make sure the record exists before patching; json-server would
        // otherwise report a bare 404.
        self.get_patient(patient_id).await?;

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            update_data.insert("dateOfBirth".to_string(), json!(date_of_birth));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(password) = request.password {
            update_data.insert("password".to_string(), json!(password));
        }

        let patient: Patient = self
            .store
            .patch(
                "patients",
                &patient_id.to_string(),
                serde_json::Value::Object(update_data),
            )
            .await?;

        Ok(patient.into())
    }
}
