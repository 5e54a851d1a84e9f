use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use storefront_core::catalog::CatalogAggregator;
use storefront_core::domain::product::{NewProductRequest, Product, PurchaseHistoryItem};
use storefront_core::errors::CatalogError;

use crate::error::ApiError;

#[derive(Clone)]
pub struct ApiState {
    catalog: CatalogAggregator,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub history: Option<Vec<PurchaseHistoryItem>>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn router(catalog: CatalogAggregator) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/add-product", post(create_product))
        .route("/api/products/{id}", get(get_product).delete(delete_product))
        .route("/api/delete-product/{id}", delete(delete_product))
        .route("/api/categories", get(list_categories))
        .route("/api/recommend", post(recommend))
        .with_state(ApiState { catalog })
}

/// Browser clients are admitted only from the configured origins, with credentials.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    event_name = "system.cors.origin_skipped",
                    origin = %origin,
                    "ignoring allowed origin that is not a valid header value"
                );
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

async fn list_products(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let correlation_id = correlation_id();
    let products = state
        .catalog
        .list_products(query.category.as_deref())
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let correlation_id = correlation_id();
    let product = state
        .catalog
        .get_product(&id)
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    Ok(Json(product))
}

async fn list_categories(State(state): State<ApiState>) -> Result<Json<Vec<String>>, ApiError> {
    let correlation_id = correlation_id();
    let categories = state
        .catalog
        .list_categories()
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    Ok(Json(categories))
}

async fn create_product(
    State(state): State<ApiState>,
    payload: Result<Json<NewProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let correlation_id = correlation_id();
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(CatalogError::Validation(rejection.body_text()), &correlation_id)
    })?;

    let new_product = request.validate().map_err(|error| ApiError::new(error, &correlation_id))?;
    let product = state
        .catalog
        .create_product(new_product)
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;

    info!(
        event_name = "api.product.created",
        correlation_id = %correlation_id,
        product_id = %product.id,
        "product added"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { message: "Product added successfully", product }),
    ))
}

async fn delete_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let correlation_id = correlation_id();
    state
        .catalog
        .delete_product(&id)
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;

    info!(
        event_name = "api.product.deleted",
        correlation_id = %correlation_id,
        product_id = %id,
        "product deleted"
    );
    Ok(Json(MessageResponse { message: "Product deleted successfully" }))
}

async fn recommend(
    State(state): State<ApiState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let correlation_id = correlation_id();
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(CatalogError::Validation(rejection.body_text()), &correlation_id)
    })?;

    let history = request.history.unwrap_or_default();
    let products = state
        .catalog
        .recommend(&history)
        .await
        .map_err(|error| ApiError::new(error, &correlation_id))?;
    Ok(Json(products))
}
