use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use storefront_core::catalog::ExternalCatalog;
use storefront_core::config::CatalogConfig;
use storefront_core::domain::product::{ExternalProductId, ExternalProductRecord, UnifiedId};
use storefront_core::errors::CatalogError;

/// Client for a DummyJSON-shaped product catalog.
#[derive(Clone)]
pub struct HttpExternalCatalog {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ProductPage {
    #[serde(default)]
    products: Vec<ExternalProductRecord>,
}

/// Category listings come either as bare slugs or as `{slug, name, url}` objects
/// depending on the upstream version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Slug(String),
    Described {
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CategoryEntry {
    fn into_slug(self) -> Option<String> {
        match self {
            Self::Slug(slug) => Some(slug),
            Self::Described { slug, name } => slug.or(name),
        }
    }
}

impl HttpExternalCatalog {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self::new(client, config.base_url.clone()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        missing: Option<CatalogError>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(event_name = "catalog.external.request", url = %url, "calling external catalog");

        let response = self.client.get(&url).query(query).send().await.map_err(|error| {
            CatalogError::UpstreamUnavailable(format!("request to {url} failed: {error}"))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(missing) = missing {
                return Err(missing);
            }
        }
        if !status.is_success() {
            return Err(CatalogError::UpstreamUnavailable(format!(
                "{url} responded with status {status}"
            )));
        }

        response.json::<T>().await.map_err(|error| {
            CatalogError::UpstreamUnavailable(format!("invalid payload from {url}: {error}"))
        })
    }
}

#[async_trait]
impl ExternalCatalog for HttpExternalCatalog {
    async fn list_products(&self, limit: u32) -> Result<Vec<ExternalProductRecord>, CatalogError> {
        let page: ProductPage =
            self.fetch("/products", &[("limit", limit.to_string())], None).await?;
        Ok(page.products)
    }

    async fn get_product(
        &self,
        id: ExternalProductId,
    ) -> Result<ExternalProductRecord, CatalogError> {
        let missing = CatalogError::NotFound(UnifiedId::External(id).to_string());
        self.fetch(&format!("/products/{id}"), &[], Some(missing)).await
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let entries: Vec<CategoryEntry> = self.fetch("/products/categories", &[], None).await?;
        Ok(entries.into_iter().filter_map(CategoryEntry::into_slug).collect())
    }
}
