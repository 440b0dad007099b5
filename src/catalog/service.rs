use crate::client::CatalogApi;
use crate::config::CacheConfig;
use crate::error::{AppError, Result};
use crate::models::{CatalogType, Model, ModelYear, Paginated, Part, Submodel, Version};
use crate::state::QueryCache;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identifies one cached listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    Types { page: u32 },
    Models { type_id: String },
    Submodels { model_id: String },
    ModelYears { submodel_id: String },
    Versions { model_year_id: String },
    Parts {
        model_year_id: String,
        version_id: Option<String>,
    },
}

/// What the year step of the drill-down should show
#[derive(Debug, Clone, PartialEq)]
pub enum YearStep {
    /// The year has versions to choose from
    Versions(Vec<Version>),
    /// No versions: go straight to the parts listing
    Parts,
}

/// Cached access to the catalog listings.
///
/// Each listing stays fresh for the configured stale time and is kept for the
/// retention period after its last use. Failed fetches surface as errors so
/// the caller can offer a retry; `retry` drops the entry before refetching.
pub struct Catalog<A: CatalogApi> {
    api: Arc<A>,
    types: QueryCache<CatalogKey, Paginated<CatalogType>>,
    models: QueryCache<CatalogKey, Vec<Model>>,
    submodels: QueryCache<CatalogKey, Vec<Submodel>>,
    model_years: QueryCache<CatalogKey, Vec<ModelYear>>,
    versions: QueryCache<CatalogKey, Vec<Version>>,
    parts: QueryCache<CatalogKey, Vec<Part>>,
}

fn require_id<'a>(what: &str, id: &'a str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} id must not be empty", what)));
    }
    Ok(trimmed)
}

fn listing_cache<V>(config: &CacheConfig) -> QueryCache<CatalogKey, V>
where
    V: Clone + Send + Sync + 'static,
{
    QueryCache::new(
        config.max_capacity,
        config.stale_time(),
        config.retention(),
    )
}

impl<A: CatalogApi> Catalog<A> {
    pub fn new(api: Arc<A>, config: &CacheConfig) -> Self {
        Self {
            api,
            types: listing_cache(config),
            models: listing_cache(config),
            submodels: listing_cache(config),
            model_years: listing_cache(config),
            versions: listing_cache(config),
            parts: listing_cache(config),
        }
    }

    /// One page of catalog types
    pub async fn types(&self, page: u32) -> Result<Paginated<CatalogType>> {
        let page = page.max(1);
        self.types
            .get_or_fetch(CatalogKey::Types { page }, || self.api.get_types(page))
            .await
    }

    /// Warm the cache for several type pages at once
    pub async fn prefetch_types(&self, pages: impl IntoIterator<Item = u32>) {
        let results = join_all(pages.into_iter().map(|page| async move {
            (page, self.types(page).await)
        }))
        .await;

        for (page, result) in results {
            if let Err(e) = result {
                warn!(page = page, error = %e, "Failed to prefetch catalog types");
            } else {
                debug!(page = page, "Prefetched catalog types");
            }
        }
    }

    pub async fn models(&self, type_id: &str) -> Result<Vec<Model>> {
        let type_id = require_id("type", type_id)?;
        let key = CatalogKey::Models {
            type_id: type_id.to_string(),
        };
        self.models
            .get_or_fetch(key, || self.api.get_models(type_id))
            .await
    }

    pub async fn submodels(&self, model_id: &str) -> Result<Vec<Submodel>> {
        let model_id = require_id("model", model_id)?;
        let key = CatalogKey::Submodels {
            model_id: model_id.to_string(),
        };
        self.submodels
            .get_or_fetch(key, || self.api.get_submodels(model_id))
            .await
    }

    pub async fn model_years(&self, submodel_id: &str) -> Result<Vec<ModelYear>> {
        let submodel_id = require_id("submodel", submodel_id)?;
        let key = CatalogKey::ModelYears {
            submodel_id: submodel_id.to_string(),
        };
        self.model_years
            .get_or_fetch(key, || self.api.get_model_years(submodel_id))
            .await
    }

    pub async fn versions(&self, model_year_id: &str) -> Result<Vec<Version>> {
        let model_year_id = require_id("model year", model_year_id)?;
        let key = CatalogKey::Versions {
            model_year_id: model_year_id.to_string(),
        };
        self.versions
            .get_or_fetch(key, || self.api.get_versions(model_year_id))
            .await
    }

    pub async fn parts(&self, model_year_id: &str, version_id: Option<&str>) -> Result<Vec<Part>> {
        let model_year_id = require_id("model year", model_year_id)?;
        let version_id = version_id.map(str::trim).filter(|v| !v.is_empty());
        let key = CatalogKey::Parts {
            model_year_id: model_year_id.to_string(),
            version_id: version_id.map(str::to_string),
        };
        self.parts
            .get_or_fetch(key, || self.api.get_parts(model_year_id, version_id))
            .await
    }

    /// Decide whether a model year needs a version choice or goes straight to parts
    pub async fn year_step(&self, model_year_id: &str) -> Result<YearStep> {
        let versions = self.versions(model_year_id).await?;
        if versions.is_empty() {
            info!(model_year_id = model_year_id, "No versions, redirecting to parts");
            Ok(YearStep::Parts)
        } else {
            Ok(YearStep::Versions(versions))
        }
    }

    /// Drop a cached listing so the next read goes to the API
    pub async fn invalidate(&self, key: &CatalogKey) {
        match key {
            CatalogKey::Types { .. } => self.types.invalidate(key).await,
            CatalogKey::Models { .. } => self.models.invalidate(key).await,
            CatalogKey::Submodels { .. } => self.submodels.invalidate(key).await,
            CatalogKey::ModelYears { .. } => self.model_years.invalidate(key).await,
            CatalogKey::Versions { .. } => self.versions.invalidate(key).await,
            CatalogKey::Parts { .. } => self.parts.invalidate(key).await,
        }
    }

    /// The "Retry" action of a detail view: forget the entry and fetch again
    pub async fn retry_models(&self, type_id: &str) -> Result<Vec<Model>> {
        self.invalidate(&CatalogKey::Models {
            type_id: type_id.trim().to_string(),
        })
        .await;
        self.models(type_id).await
    }

    pub async fn retry_submodels(&self, model_id: &str) -> Result<Vec<Submodel>> {
        self.invalidate(&CatalogKey::Submodels {
            model_id: model_id.trim().to_string(),
        })
        .await;
        self.submodels(model_id).await
    }

    pub async fn retry_model_years(&self, submodel_id: &str) -> Result<Vec<ModelYear>> {
        self.invalidate(&CatalogKey::ModelYears {
            submodel_id: submodel_id.trim().to_string(),
        })
        .await;
        self.model_years(submodel_id).await
    }

    pub async fn retry_parts(&self, model_year_id: &str, version_id: Option<&str>) -> Result<Vec<Part>> {
        self.invalidate(&CatalogKey::Parts {
            model_year_id: model_year_id.trim().to_string(),
            version_id: version_id
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        })
        .await;
        self.parts(model_year_id, version_id).await
    }

    /// Forget everything
    pub async fn clear(&self) {
        self.types.invalidate_all().await;
        self.models.invalidate_all().await;
        self.submodels.invalidate_all().await;
        self.model_years.invalidate_all().await;
        self.versions.invalidate_all().await;
        self.parts.invalidate_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        fail_models: Mutex<bool>,
        versions: Vec<Version>,
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl CatalogApi for FakeApi {
        async fn get_types(&self, page: u32) -> Result<Paginated<CatalogType>> {
            self.record(format!("types:{}", page));
            Ok(Paginated {
                data: vec![CatalogType {
                    id: page.to_string(),
                    name: format!("Type {}", page),
                    image: None,
                }],
                links: vec![],
                meta: None,
            })
        }

        async fn get_models(&self, type_id: &str) -> Result<Vec<Model>> {
            self.record(format!("models:{}", type_id));
            if *self.fail_models.lock() {
                return Err(AppError::Server {
                    status: 503,
                    body: String::new(),
                });
            }
            Ok(vec![Model {
                id: "civic".to_string(),
                name: "Civic".to_string(),
                type_id: Some(type_id.to_string()),
                image: None,
            }])
        }

        async fn get_submodels(&self, model_id: &str) -> Result<Vec<Submodel>> {
            self.record(format!("submodels:{}", model_id));
            Ok(vec![])
        }

        async fn get_model_years(&self, submodel_id: &str) -> Result<Vec<ModelYear>> {
            self.record(format!("years:{}", submodel_id));
            Ok(vec![])
        }

        async fn get_versions(&self, model_year_id: &str) -> Result<Vec<Version>> {
            self.record(format!("versions:{}", model_year_id));
            Ok(self.versions.clone())
        }

        async fn get_parts(&self, model_year_id: &str, version_id: Option<&str>) -> Result<Vec<Part>> {
            self.record(format!("parts:{}:{}", model_year_id, version_id.unwrap_or("-")));
            Ok(vec![])
        }
    }

    fn catalog(api: FakeApi) -> (Arc<FakeApi>, Catalog<FakeApi>) {
        let api = Arc::new(api);
        let catalog = Catalog::new(api.clone(), &CacheConfig::default());
        (api, catalog)
    }

    #[tokio::test]
    async fn test_listing_is_cached() {
        let (api, catalog) = catalog(FakeApi::default());

        catalog.models("1").await.unwrap();
        catalog.models("1").await.unwrap();
        catalog.models("2").await.unwrap();

        assert_eq!(api.calls(), vec!["models:1", "models:2"]);
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_without_request() {
        let (api, catalog) = catalog(FakeApi::default());

        let err = catalog.submodels("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let (api, catalog) = catalog(FakeApi::default());
        *api.fail_models.lock() = true;

        assert!(catalog.models("1").await.is_err());

        *api.fail_models.lock() = false;
        let models = catalog.retry_models("1").await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(api.calls(), vec!["models:1", "models:1"]);
    }

    #[tokio::test]
    async fn test_parts_cached_per_version() {
        let (api, catalog) = catalog(FakeApi::default());

        catalog.parts("y1", None).await.unwrap();
        catalog.parts("y1", Some("v1")).await.unwrap();
        catalog.parts("y1", Some("")).await.unwrap();

        assert_eq!(api.calls(), vec!["parts:y1:-", "parts:y1:v1"]);
    }

    #[tokio::test]
    async fn test_year_step_redirects_without_versions() {
        let (_, catalog_without) = catalog(FakeApi::default());
        assert_eq!(catalog_without.year_step("y1").await.unwrap(), YearStep::Parts);

        let (_, catalog_with) = catalog(FakeApi {
            versions: vec![Version {
                id: "v1".to_string(),
                name: "Sport".to_string(),
                image: None,
            }],
            ..Default::default()
        });
        assert!(matches!(
            catalog_with.year_step("y1").await.unwrap(),
            YearStep::Versions(v) if v.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_prefetch_warms_type_pages() {
        let (api, catalog) = catalog(FakeApi::default());

        catalog.prefetch_types([1, 2]).await;
        catalog.types(1).await.unwrap();
        catalog.types(2).await.unwrap();

        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["types:1", "types:2"]);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (api, catalog) = catalog(FakeApi::default());

        tokio_test::block_on(async {
            tokio_test::assert_ok!(catalog.versions("y1").await);
            catalog
                .invalidate(&CatalogKey::Versions {
                    model_year_id: "y1".to_string(),
                })
                .await;
            tokio_test::assert_ok!(catalog.versions("y1").await);

            catalog.clear().await;
            tokio_test::assert_ok!(catalog.versions("y1").await);
        });

        assert_eq!(api.calls(), vec!["versions:y1"; 3]);
    }

    #[tokio::test]
    async fn test_each_listing_caches_separately() {
        let (api, catalog) = catalog(FakeApi::default());

        for _ in 0..2 {
            catalog.types(1).await.unwrap();
            catalog.models("x").await.unwrap();
            catalog.submodels("x").await.unwrap();
            catalog.model_years("x").await.unwrap();
            catalog.versions("x").await.unwrap();
            catalog.parts("x", None).await.unwrap();
        }

        assert_eq!(
            api.calls(),
            vec![
                "types:1",
                "models:x",
                "submodels:x",
                "years:x",
                "versions:x",
                "parts:x:-",
            ]
        );
    }
}
