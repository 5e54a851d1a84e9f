use std::sync::Arc;

use axum::Router;
use storefront_core::catalog::CatalogAggregator;
use storefront_core::config::{AppConfig, ConfigError};
use storefront_db::{connect, migrations, DbPool, SqlProductRepository};
use thiserror::Error;
use tracing::info;

use crate::upstream::HttpExternalCatalog;
use crate::{api, health};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: CatalogAggregator,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("external catalog client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl Application {
    /// Health and catalog routes behind the CORS policy.
    pub fn router(&self) -> Router {
        health::router(self.db_pool.clone())
            .merge(api::router(self.catalog.clone()))
            .layer(api::cors_layer(&self.config.server.allowed_origins))
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let external =
        HttpExternalCatalog::from_config(&config.catalog).map_err(BootstrapError::HttpClient)?;
    let catalog = CatalogAggregator::new(
        Arc::new(SqlProductRepository::new(db_pool.clone())),
        Arc::new(external),
    );
    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        catalog_base_url = %config.catalog.base_url,
        catalog_timeout_secs = config.catalog.timeout_secs,
        "catalog aggregator initialized"
    );

    Ok(Application { config, db_pool, catalog })
}
