use crate::catalog::routes;
use crate::client::normalize::{normalize_list, normalize_search_results};
use crate::client::traits::{CatalogApi, SearchService};
use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::{CatalogType, Model, ModelYear, Paginated, Part, SearchResultItem, Submodel, Version};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP client for the catalog REST API
#[derive(Clone)]
pub struct CatalogClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) types_per_page: u32,
}

impl CatalogClient {
    /// Create a new client; fails when no API key can be resolved
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| AppError::Configuration(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .user_agent(concat!("parts-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            types_per_page: config.types_per_page,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the body as JSON
    async fn execute(&self, request: RequestBuilder, endpoint: &str) -> Result<Value> {
        let started = Instant::now();

        let response = request.send().await.map_err(|e| {
            warn!(endpoint = endpoint, error = %e, "Catalog API request failed");
            AppError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            endpoint = endpoint,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog API responded"
        );

        // Check for success status codes (2xx)
        if !status.is_success() {
            warn!(endpoint = endpoint, status = status.as_u16(), "Catalog API returned non-success status");
            return Err(AppError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(AppError::from)
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: String) -> Result<Vec<T>> {
        let body = self.execute(self.client.get(self.url(&path)), &path).await?;
        normalize_list(body)
    }
}

/// Percent-encode an id before placing it in a path
fn segment(id: &str) -> String {
    routes::encode_component(id)
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn get_types(&self, page: u32) -> Result<Paginated<CatalogType>> {
        let path = "/v2/user/types/index";
        let request = self
            .client
            .get(self.url(path))
            .query(&[("page", page), ("per_page", self.types_per_page)]);

        let body = self.execute(request, path).await?;
        serde_json::from_value(body).map_err(AppError::from)
    }

    async fn get_models(&self, type_id: &str) -> Result<Vec<Model>> {
        self.get_list(format!("/v2/user/{}/models/index", segment(type_id)))
            .await
    }

    async fn get_submodels(&self, model_id: &str) -> Result<Vec<Submodel>> {
        self.get_list(format!("/v2/user/{}/submodels/index", segment(model_id)))
            .await
    }

    async fn get_model_years(&self, submodel_id: &str) -> Result<Vec<ModelYear>> {
        self.get_list(format!("/v2/user/{}/modelYears/index", segment(submodel_id)))
            .await
    }

    async fn get_versions(&self, model_year_id: &str) -> Result<Vec<Version>> {
        self.get_list(format!("/v2/user/{}/versions/index", segment(model_year_id)))
            .await
    }

    async fn get_parts(&self, model_year_id: &str, version_id: Option<&str>) -> Result<Vec<Part>> {
        let path = format!("/v2/user/{}/parts/index", segment(model_year_id));
        let mut request = self.client.get(self.url(&path));
        if let Some(version_id) = version_id {
            request = request.query(&[("versionId", version_id)]);
        }

        let body = self.execute(request, &path).await?;
        normalize_list(body)
    }
}

#[async_trait]
impl SearchService for CatalogClient {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<SearchResultItem>> {
        let path = format!("/v2/search/{}", segment(query));
        let request = self
            .client
            .post(self.url(&path))
            .query(&[("page", page), ("per_page", per_page)]);

        let body = self.execute(request, "/v2/search").await?;
        normalize_search_results(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new(&config("https://example.com/api/")).unwrap();
        assert_eq!(client.base_url(), "https://example.com/api");
        assert_eq!(client.url("/v2/x"), "https://example.com/api/v2/x");
    }

    #[test]
    fn test_client_requires_api_key() {
        let api = ApiConfig {
            api_key: None,
            api_key_env: "PARTS_CATALOG_HTTP_TEST_UNSET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            CatalogClient::new(&api),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("Sedan 4-Door"), "Sedan%204-Door");
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("pads (front)"), "pads%20(front)");
    }
}
