use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use storefront_core::domain::product::{LocalProduct, LocalProductId};

use crate::connection::DbPool;
use crate::repositories::{RepositoryError, SqlProductRepository};

/// Merchant products loaded into an empty store for demos and local development.
const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Stoneware Mug",
        price: "12.50",
        image: "https://images.example.com/products/stoneware-mug.jpg",
        description: "Hand-glazed 350ml mug, dishwasher safe.",
        category: "Kitchen",
    },
    DemoProduct {
        name: "Cast Iron Skillet",
        price: "39.00",
        image: "https://images.example.com/products/cast-iron-skillet.jpg",
        description: "Pre-seasoned 26cm skillet for stovetop and oven.",
        category: "Kitchen",
    },
    DemoProduct {
        name: "Field Notes Journal",
        price: "8.75",
        image: "https://images.example.com/products/field-notes.jpg",
        description: "Pocket journal with 48 dot-grid pages.",
        category: "Stationery",
    },
    DemoProduct {
        name: "Merino Beanie",
        price: "24.00",
        image: "https://images.example.com/products/merino-beanie.jpg",
        description: "Ribbed knit beanie in 100% merino wool.",
        category: "Clothing",
    },
];

struct DemoProduct {
    name: &'static str,
    price: &'static str,
    image: &'static str,
    description: &'static str,
    category: &'static str,
}

pub struct DemoCatalog;

impl DemoCatalog {
    pub fn len() -> usize {
        DEMO_PRODUCTS.len()
    }

    /// Inserts the demo products unless the store already holds products.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let repo = SqlProductRepository::new(pool.clone());
        let existing = repo.count().await?;
        if existing > 0 {
            info!(
                event_name = "db.seed.skipped",
                existing_products = existing,
                "store already holds products; demo catalog not loaded"
            );
            return Ok(SeedResult { inserted: 0, existing: existing as usize });
        }

        for demo in DEMO_PRODUCTS {
            let price = Decimal::from_str(demo.price)
                .map_err(|e| RepositoryError::Decode(format!("demo price `{}`: {e}", demo.price)))?;
            repo.insert(&LocalProduct {
                id: LocalProductId::generate(),
                name: demo.name.to_string(),
                price,
                image: demo.image.to_string(),
                description: demo.description.to_string(),
                category: Some(demo.category.to_string()),
                created_at: Utc::now(),
            })
            .await?;
        }

        info!(event_name = "db.seed.loaded", inserted = DEMO_PRODUCTS.len(), "demo catalog loaded");
        Ok(SeedResult { inserted: DEMO_PRODUCTS.len(), existing: 0 })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub existing: usize,
}

#[cfg(test)]
mod tests {
    use storefront_core::catalog::LocalCatalog;

    use super::DemoCatalog;
    use crate::repositories::SqlProductRepository;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seed_loads_once_and_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");

        let first = DemoCatalog::load(&pool).await.expect("load demo catalog");
        let second = DemoCatalog::load(&pool).await.expect("reload demo catalog");

        assert_eq!(first.inserted, DemoCatalog::len());
        assert_eq!(second.inserted, 0);
        assert_eq!(second.existing, DemoCatalog::len());

        let repo = SqlProductRepository::new(pool);
        let categories = repo.distinct_categories().await.expect("categories");
        assert_eq!(categories, vec!["Kitchen", "Stationery", "Clothing"]);
    }
}
