use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use storefront_core::catalog::LocalCatalog;
use storefront_core::domain::product::{LocalProduct, LocalProductId, NewProduct};
use storefront_core::errors::CatalogError;

use super::RepositoryError;
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM product").fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn insert(&self, product: &LocalProduct) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, name, price, image, description, category, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(product.price.to_string())
        .bind(&product.image)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<LocalProduct, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price_str: String =
        row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let image: String = row.try_get("image").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: Option<String> =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let price = Decimal::from_str(&price_str)
        .map_err(|e| RepositoryError::Decode(format!("product `{id}` price: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(LocalProduct {
        id: LocalProductId(id),
        name,
        price,
        image,
        description,
        category,
        created_at,
    })
}

#[async_trait::async_trait]
impl LocalCatalog for SqlProductRepository {
    async fn find(&self, category: Option<&str>) -> Result<Vec<LocalProduct>, CatalogError> {
        let rows = match category {
            Some(category) => {
                sqlx::query(
                    "SELECT id, name, price, image, description, category, created_at
                     FROM product WHERE category = ? ORDER BY rowid",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, name, price, image, description, category, created_at
                     FROM product ORDER BY rowid",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(RepositoryError::from)?;

        let products = rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    async fn find_one(&self, id: &LocalProductId) -> Result<Option<LocalProduct>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, name, price, image, description, category, created_at
             FROM product WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
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
        self.insert(&stored).await?;
        Ok(stored)
    }

    async fn delete_one(&self, id: &LocalProductId) -> Result<u64, CatalogError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, CatalogError> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT category FROM product
             WHERE category IS NOT NULL
             GROUP BY category
             ORDER BY MIN(rowid)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use storefront_core::catalog::LocalCatalog;
    use storefront_core::domain::product::{LocalProduct, LocalProductId, NewProduct};
    use storefront_core::errors::CatalogError;

    use super::SqlProductRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Decimal::new(1999, 2),
            image: format!("https://img.example/{name}.png"),
            description: format!("{name} description"),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_find_one_round_trips_every_field() {
        let repo = SqlProductRepository::new(setup().await);

        let stored = repo.insert_one(new_product("Mug", "Kitchen")).await.expect("insert");
        let found = repo.find_one(&stored.id).await.expect("find").expect("present");

        assert_eq!(found.id, stored.id);
        assert_eq!(found.name, "Mug");
        assert_eq!(found.price, Decimal::new(1999, 2));
        assert_eq!(found.image, "https://img.example/Mug.png");
        assert_eq!(found.description, "Mug description");
        assert_eq!(found.category.as_deref(), Some("Kitchen"));
        assert!(LocalProductId::parse(found.id.as_str()).is_some());
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_and_filters_exactly() {
        let repo = SqlProductRepository::new(setup().await);
        for (name, category) in
            [("Mug", "Kitchen"), ("Novel", "Books"), ("Pan", "Kitchen"), ("Atlas", "books")]
        {
            repo.insert_one(new_product(name, category)).await.expect("insert");
        }

        let all: Vec<String> =
            repo.find(None).await.expect("find").into_iter().map(|p| p.name).collect();
        let kitchen: Vec<String> =
            repo.find(Some("Kitchen")).await.expect("find").into_iter().map(|p| p.name).collect();
        let books: Vec<String> =
            repo.find(Some("Books")).await.expect("find").into_iter().map(|p| p.name).collect();

        assert_eq!(all, vec!["Mug", "Novel", "Pan", "Atlas"]);
        assert_eq!(kitchen, vec!["Mug", "Pan"]);
        assert_eq!(books, vec!["Novel"]);
    }

    #[tokio::test]
    async fn unknown_keys_are_absent() {
        let repo = SqlProductRepository::new(setup().await);

        let found = repo.find_one(&LocalProductId("1005".to_string())).await.expect("find");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let repo = SqlProductRepository::new(setup().await);
        let stored = repo.insert_one(new_product("Mug", "Kitchen")).await.expect("insert");

        assert_eq!(repo.delete_one(&stored.id).await.expect("delete"), 1);
        assert_eq!(repo.delete_one(&stored.id).await.expect("delete again"), 0);
        assert!(repo.find_one(&stored.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn distinct_categories_skip_missing_values() {
        let repo = SqlProductRepository::new(setup().await);
        repo.insert_one(new_product("Mug", "Kitchen")).await.expect("insert");
        repo.insert_one(new_product("Novel", "Books")).await.expect("insert");
        repo.insert_one(new_product("Pan", "Kitchen")).await.expect("insert");
        repo.insert(&LocalProduct {
            id: LocalProductId::generate(),
            name: "Legacy".to_string(),
            price: Decimal::ONE,
            image: String::new(),
            description: String::new(),
            category: None,
            created_at: Utc::now(),
        })
        .await
        .expect("insert uncategorised");

        let categories = repo.distinct_categories().await.expect("categories");

        assert_eq!(categories, vec!["Kitchen".to_string(), "Books".to_string()]);
        assert_eq!(repo.count().await.expect("count"), 4);
    }

    #[tokio::test]
    async fn closed_pool_surfaces_store_errors() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool.clone());
        pool.close().await;

        let result = repo.find(None).await;

        assert!(matches!(result, Err(CatalogError::Store(_))));
    }
}
