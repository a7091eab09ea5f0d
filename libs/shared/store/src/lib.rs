pub mod json_api;

pub use json_api::{JsonApiClient, ListQuery, Page, SortOrder, StoreError};
