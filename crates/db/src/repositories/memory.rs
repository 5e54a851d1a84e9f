use chrono::Utc;
use tokio::sync::RwLock;

use storefront_core::catalog::LocalCatalog;
use storefront_core::domain::product::{LocalProduct, LocalProductId, NewProduct};
use storefront_core::errors::CatalogError;

/// Local catalog backed by a vector; used by the API router tests.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<LocalProduct>>,
}

#[async_trait::async_trait]
impl LocalCatalog for InMemoryProductRepository {
    async fn find(&self, category: Option<&str>) -> Result<Vec<LocalProduct>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|product| match category {
                Some(category) => product.category.as_deref() == Some(category),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: &LocalProductId) -> Result<Option<LocalProduct>, CatalogError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn insert_one(&self, product: NewProduct) -> Result<LocalProduct, CatalogError> {
        let stored = LocalProduct {
            id: LocalProductId::generate(),
            name: product.name,
            price: product.price,
            image: product.image,
            description: product.description,
            category: Some(product.category),
            created_at: Utc::now(),
        };
        let mut products = self.products.write().await;
        products.push(stored.clone());
        Ok(stored)
    }

    async fn delete_one(&self, id: &LocalProductId) -> Result<u64, CatalogError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| &product.id != id);
        Ok((before - products.len()) as u64)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError> {
        let products = self.products.read().await;
        let mut categories: Vec<String> = Vec::new();
        for category in products.iter().filter_map(|product| product.category.as_ref()) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use storefront_core::catalog::LocalCatalog;
    use storefront_core::domain::product::NewProduct;

    use super::InMemoryProductRepository;

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Decimal::new(500, 2),
            image: "img".to_string(),
            description: "desc".to_string(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_product_repo_round_trip() {
        let repo = InMemoryProductRepository::default();

        let stored = repo.insert_one(new_product("Mug", "Kitchen")).await.expect("insert");
        let found = repo.find_one(&stored.id).await.expect("find").expect("present");

        assert_eq!(found, stored);
        assert_eq!(repo.delete_one(&stored.id).await.expect("delete"), 1);
        assert!(repo.find_one(&stored.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn in_memory_product_repo_filters_and_dedups_categories() {
        let repo = InMemoryProductRepository::default();
        for (name, category) in [("Mug", "Kitchen"), ("Novel", "Books"), ("Pan", "Kitchen")] {
            repo.insert_one(new_product(name, category)).await.expect("insert");
        }

        let kitchen = repo.find(Some("Kitchen")).await.expect("find");
        let categories = repo.distinct_categories().await.expect("categories");

        assert_eq!(kitchen.len(), 2);
        assert_eq!(categories, vec!["Kitchen".to_string(), "Books".to_string()]);
    }
}
