//! Product aggregation over the two catalog sources.
//!
//! The local store holds merchant-owned products; the external catalog is a
//! read-only remote service. [`CatalogAggregator`] merges both into one
//! uniform [`Product`](crate::domain::product::Product) view, using
//! [`IdentityMapper`] to keep their identifier spaces disjoint.

use async_trait::async_trait;

use crate::domain::product::{
    ExternalProductId, ExternalProductRecord, LocalProduct, LocalProductId, NewProduct,
};
use crate::errors::CatalogError;

pub mod aggregator;
pub mod identity;
pub mod recommender;

pub use aggregator::CatalogAggregator;
pub use identity::IdentityMapper;
pub use recommender::{Recommender, RECOMMENDATION_LIMIT};

/// Merchant-owned product collection. Implementations report persistence
/// failures as [`CatalogError::Store`].
#[async_trait]
pub trait LocalCatalog: Send + Sync {
    /// All products in insertion order, optionally restricted to one exact category.
    async fn find(&self, category: Option<&str>) -> Result<Vec<LocalProduct>, CatalogError>;

    async fn find_one(&self, id: &LocalProductId) -> Result<Option<LocalProduct>, CatalogError>;

    async fn insert_one(&self, product: NewProduct) -> Result<LocalProduct, CatalogError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(&self, id: &LocalProductId) -> Result<u64, CatalogError>;

    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError>;
}

/// Read-only remote catalog. Transport failures and upstream 5xx responses
/// surface as [`CatalogError::UpstreamUnavailable`].
#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    async fn list_products(&self, limit: u32) -> Result<Vec<ExternalProductRecord>, CatalogError>;

    async fn get_product(
        &self,
        id: ExternalProductId,
    ) -> Result<ExternalProductRecord, CatalogError>;

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError>;
}
