use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Doctor profile as stored in the remote collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub qualification: String,
    pub experience_years: i32,
    pub clinic_address: String,
    pub city: String,
    pub fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub available_days: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Search filters accepted by `GET /doctors`. Sorting is limited to the
/// fields the store can actually order by. Paging and sorting are accepted
/// both bare and in the store's underscore spelling, so the endpoint can be
/// driven with the same parameter names the store itself uses.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialty: Option<String>,
    pub city: Option<String>,
    pub q: Option<String>,
    #[serde(alias = "_sort")]
    pub sort: Option<DoctorSortField>,
    #[serde(alias = "_order")]
    pub order: Option<String>,
    #[serde(alias = "_page")]
    pub page: Option<u32>,
    #[serde(alias = "_limit")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoctorSortField {
    Fee,
    ExperienceYears,
}

impl DoctorSortField {
    pub fn store_field(&self) -> &'static str {
        match self {
            DoctorSortField::Fee => "fee",
            DoctorSortField::ExperienceYears => "experienceYears",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
