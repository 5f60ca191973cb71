//! Shared application state

use cinetheque_core::{PageQuery, PageRequest};
use cinetheque_db::Catalog;
use cinetheque_storage::Storage;
use std::sync::Arc;

use crate::services::MediaUploader;

/// Everything handlers need: the catalog (pool-bound repositories plus the
/// transaction factory) and the uploader writing to the public disk.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub uploader: MediaUploader,
    pub default_per_page: i64,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, storage: Arc<dyn Storage>, default_per_page: i64) -> Self {
        Self {
            catalog,
            uploader: MediaUploader::new(storage),
            default_per_page,
        }
    }

    /// Normalize `?perPage=&page=` with the configured default page size
    pub fn page_request(&self, query: &PageQuery) -> PageRequest {
        PageRequest::from_query(query, self.default_per_page)
    }
}
