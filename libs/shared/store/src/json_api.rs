use std::time::Duration;

use reqwest::{
    Client, Method, StatusCode,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::AppError;

/// Pagination total emitted by json-server style backends.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("store error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid store payload: {0}")]
    Decode(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unreachable(msg) => AppError::ExternalService(msg),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Api { status, message } => {
                AppError::Database(format!("store returned {}: {}", status, message))
            }
            StoreError::Decode(msg) => AppError::Internal(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query-string builder for collection endpoints. Filters are plain
/// `field=value` pairs; `_page`/`_limit`/`_sort`/`_order` follow the
/// json-server conventions.
#[derive(Debug, Default, Clone)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    page: Option<u32>,
    limit: Option<u32>,
    sort: Option<(String, SortOrder)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl ToString) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self
            .filters
            .iter()
            .map(|(field, value)| format!("{}={}", field, urlencoding::encode(value)))
            .collect();

        if let Some((field, order)) = &self.sort {
            parts.push(format!("_sort={}", urlencoding::encode(field)));
            parts.push(format!("_order={}", order.as_str()));
        }
        if let Some(page) = self.page {
            parts.push(format!("_page={}", page));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("_limit={}", limit));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// A page of a collection, with the total taken from `X-Total-Count`
/// when the store provides it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub struct JsonApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl JsonApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.store_timeout_seconds),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers())
            .timeout(self.timeout);

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, message);

            return Err(match status {
                StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
                _ => StoreError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(response)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body.as_ref()).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Fetch a single record by id: `GET /{resource}/{id}`.
    pub async fn get_one<T>(&self, resource: &str, id: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, &format!("/{}/{}", resource, id), None)
            .await
    }

    /// Fetch all records matching the query, without pagination metadata.
    pub async fn find<T>(&self, resource: &str, query: &ListQuery) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/{}{}", resource, query.to_query_string());
        self.request(Method::GET, &path, None).await
    }

    /// Fetch one page of a collection, reading the total from
    /// `X-Total-Count` when present.
    pub async fn find_page<T>(&self, resource: &str, query: &ListQuery) -> Result<Page<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/{}{}", resource, query.to_query_string());
        let response = self.send(Method::GET, &path, None).await?;

        let total_header = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let items: Vec<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let total = total_header.unwrap_or(items.len() as u64);
        Ok(Page { items, total })
    }

    pub async fn create<T>(&self, resource: &str, body: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, &format!("/{}", resource), Some(body))
            .await
    }

    pub async fn patch<T>(&self, resource: &str, id: &str, body: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, &format!("/{}/{}", resource, id), Some(body))
            .await
    }

    pub async fn delete(&self, resource: &str, id: &str) -> Result<(), StoreError> {
        self.send(Method::DELETE, &format!("/{}/{}", resource, id), None)
            .await?;
        Ok(())
    }
}
