use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::{JsonApiClient, ListQuery, Page, SortOrder, StoreError};

use crate::models::{Doctor, DoctorError, DoctorSearchQuery};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

pub struct DoctorService {
    store: JsonApiClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonApiClient::new(config),
        }
    }

    /// Search the doctor directory. Filters map straight onto the store's
    /// query string; `q` is the store's full-text match.
    pub async fn search_doctors(
        &self,
        query: DoctorSearchQuery,
    ) -> Result<Page<Doctor>, DoctorError> {
        debug!("Searching doctors: {:?}", query);

        let mut list_query = ListQuery::new()
            .page(query.page.unwrap_or(DEFAULT_PAGE))
            .limit(query.limit.unwrap_or(DEFAULT_LIMIT));

        if let Some(specialty) = &query.specialty {
            list_query = list_query.filter("specialty", specialty);
        }
        if let Some(city) = &query.city {
            list_query = list_query.filter("city", city);
        }
        if let Some(q) = &query.q {
            list_query = list_query.filter("q", q);
        }
        if let Some(sort) = query.sort {
            let order = match query.order.as_deref() {
                Some("desc") => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            list_query = list_query.sort(sort.store_field(), order);
        }

        let page = self.store.find_page("doctors", &list_query).await?;
        Ok(page)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        self.store
            .get_one("doctors", &doctor_id.to_string())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => DoctorError::NotFound,
                other => DoctorError::Store(other),
            })
    }

    /// Distinct specialties across the directory, for filter dropdowns.
    pub async fn list_specialties(&self) -> Result<Vec<String>, DoctorError> {
        let doctors: Vec<Doctor> = self.store.find("doctors", &ListQuery::new()).await?;

        let mut specialties: Vec<String> =
            doctors.into_iter().map(|d| d.specialty).collect();
        specialties.sort();
        specialties.dedup();

        Ok(specialties)
    }
}
