//! Seams between the catalog layers and the remote API

use crate::error::Result;
use crate::models::{CatalogType, Model, ModelYear, Paginated, Part, SearchResultItem, Submodel, Version};
use async_trait::async_trait;
use std::sync::Arc;

/// The remote search endpoint as seen by the incremental search client
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fetch one page of results for a free-text query. An empty page marks the end.
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<SearchResultItem>>;
}

/// Listing endpoints backing the drill-down views
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_types(&self, page: u32) -> Result<Paginated<CatalogType>>;

    async fn get_models(&self, type_id: &str) -> Result<Vec<Model>>;

    async fn get_submodels(&self, model_id: &str) -> Result<Vec<Submodel>>;

    async fn get_model_years(&self, submodel_id: &str) -> Result<Vec<ModelYear>>;

    async fn get_versions(&self, model_year_id: &str) -> Result<Vec<Version>>;

    async fn get_parts(&self, model_year_id: &str, version_id: Option<&str>) -> Result<Vec<Part>>;
}

#[async_trait]
impl<T: SearchService + ?Sized> SearchService for Arc<T> {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<SearchResultItem>> {
        (**self).search(query, page, per_page).await
    }
}
