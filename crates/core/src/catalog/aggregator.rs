use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::identity::IdentityMapper;
use super::recommender::Recommender;
use super::{ExternalCatalog, LocalCatalog};
use crate::domain::product::{
    LocalProductId, NewProduct, Product, PurchaseHistoryItem, ALL_CATEGORIES,
    EXTERNAL_CATALOG_LIMIT,
};
use crate::errors::CatalogError;

/// Merges local and external products into one catalog view.
///
/// Local products always precede external ones. Listing operations degrade
/// to local-only results when the external catalog fails; single-product
/// lookups of external ids propagate the failure. Local store failures
/// always propagate.
#[derive(Clone)]
pub struct CatalogAggregator {
    local: Arc<dyn LocalCatalog>,
    external: Arc<dyn ExternalCatalog>,
    mapper: IdentityMapper,
    recommender: Recommender,
}

impl CatalogAggregator {
    pub fn new(local: Arc<dyn LocalCatalog>, external: Arc<dyn ExternalCatalog>) -> Self {
        Self { local, external, mapper: IdentityMapper, recommender: Recommender::default() }
    }

    pub async fn list_products(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Product>, CatalogError> {
        let filter = active_filter(category);

        let (local, external) =
            tokio::join!(self.local.find(filter), self.external_products("list_products"));

        let mut products: Vec<Product> = local?.into_iter().map(Product::from_local).collect();
        let local_count = products.len();
        match filter {
            Some(category) => products
                .extend(external.into_iter().filter(|product| product.category == category)),
            None => products.extend(external),
        }

        debug!(
            event_name = "catalog.list_products",
            category = filter.unwrap_or(ALL_CATEGORIES),
            local_count,
            external_count = products.len() - local_count,
            "aggregated product listing"
        );
        Ok(products)
    }

    /// Resolves a unified id: the local store is consulted first, then the
    /// external catalog if the id decodes into its valid range.
    pub async fn get_product(&self, raw_id: &str) -> Result<Product, CatalogError> {
        let local_key = LocalProductId(raw_id.to_string());
        if let Some(found) = self.local.find_one(&local_key).await? {
            return Ok(Product::from_local(found));
        }

        let native = self.mapper.decode_external(raw_id)?;
        let record = self.external.get_product(native).await?;
        Ok(Product::from_external(native, record))
    }

    /// Union of local and external categories. Order is not part of the contract.
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let (local, external) =
            tokio::join!(self.local.distinct_categories(), self.external.list_categories());

        let external = external.unwrap_or_else(|error| {
            degraded("list_categories", &error);
            Vec::new()
        });

        let mut seen = HashSet::new();
        let categories = local?
            .into_iter()
            .chain(external)
            .filter(|category| !category.is_empty())
            .filter(|category| seen.insert(category.clone()))
            .collect();
        Ok(categories)
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let stored = self.local.insert_one(product).await?;
        info!(
            event_name = "catalog.product_created",
            product_id = %stored.id,
            "local product created"
        );
        Ok(Product::from_local(stored))
    }

    /// Deletes a local product. Ids that are not local keys are rejected
    /// outright; external products cannot be deleted.
    pub async fn delete_product(&self, raw_id: &str) -> Result<(), CatalogError> {
        let id = LocalProductId::parse(raw_id)
            .ok_or_else(|| CatalogError::Validation(format!("invalid product id `{raw_id}`")))?;

        if self.local.delete_one(&id).await? == 0 {
            return Err(CatalogError::NotFound(raw_id.to_string()));
        }
        info!(event_name = "catalog.product_deleted", product_id = %id, "local product deleted");
        Ok(())
    }

    pub async fn recommend(
        &self,
        history: &[PurchaseHistoryItem],
    ) -> Result<Vec<Product>, CatalogError> {
        let (local, external) =
            tokio::join!(self.local.find(None), self.external_products("recommend"));

        let local = local?.into_iter().map(Product::from_local).collect();
        Ok(self.recommender.recommend(local, external, history))
    }

    async fn external_products(&self, operation: &'static str) -> Vec<Product> {
        match self.external.list_products(EXTERNAL_CATALOG_LIMIT).await {
            Ok(records) => self.mapper.project_external(records),
            Err(error) => {
                degraded(operation, &error);
                Vec::new()
            }
        }
    }
}

fn active_filter(category: Option<&str>) -> Option<&str> {
    category.filter(|value| !value.is_empty() && *value != ALL_CATEGORIES)
}

fn degraded(operation: &'static str, error: &CatalogError) {
    warn!(
        event_name = "catalog.external.degraded",
        operation,
        error = %error,
        "external catalog unavailable; serving local products only"
    );
}
