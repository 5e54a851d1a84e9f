pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{
    CatalogAggregator, ExternalCatalog, IdentityMapper, LocalCatalog, Recommender,
    RECOMMENDATION_LIMIT,
};
pub use domain::product::{
    ExternalProductId, ExternalProductRecord, LocalProduct, LocalProductId, NewProduct,
    NewProductRequest, Product, ProductOrigin, PurchaseHistoryItem, UnifiedId,
    EXTERNAL_CATALOG_LIMIT,
};
pub use errors::{CatalogError, InterfaceError};
