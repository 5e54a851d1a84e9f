use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::errors::CatalogError;

/// Highest native id the external catalog serves. Bounds both the listing
/// fetch size and the accepted native id range `1..=EXTERNAL_CATALOG_LIMIT`.
pub const EXTERNAL_CATALOG_LIMIT: u32 = 100;

/// Offset added to external native ids to move them into the unified id space.
pub const EXTERNAL_ID_OFFSET: u32 = 1000;

/// Category assigned at projection time when a source omits one.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Category filter value that means "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Store-native key of a locally owned product.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalProductId(pub String);

impl LocalProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Accepts only the canonical key shape minted by [`LocalProductId::generate`].
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = Uuid::try_parse(raw).ok()?;
        let canonical = parsed.hyphenated().to_string();
        (canonical == raw).then_some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native id of an external catalog product, always within `1..=EXTERNAL_CATALOG_LIMIT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalProductId(u32);

impl ExternalProductId {
    pub fn new(native: i64) -> Option<Self> {
        let native = u32::try_from(native).ok()?;
        (1..=EXTERNAL_CATALOG_LIMIT).contains(&native).then_some(Self(native))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ExternalProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrigin {
    Local,
    External,
}

/// Identifier exposed to callers. Rendered to its wire string only at the
/// boundary: local keys verbatim, external ids shifted by [`EXTERNAL_ID_OFFSET`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnifiedId {
    Local(LocalProductId),
    External(ExternalProductId),
}

impl UnifiedId {
    pub fn origin(&self) -> ProductOrigin {
        match self {
            Self::Local(_) => ProductOrigin::Local,
            Self::External(_) => ProductOrigin::External,
        }
    }
}

impl fmt::Display for UnifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => f.write_str(id.as_str()),
            Self::External(id) => write!(f, "{}", id.get() + EXTERNAL_ID_OFFSET),
        }
    }
}

impl Serialize for UnifiedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Uniform product view returned by every read operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: UnifiedId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: String,
    pub origin: ProductOrigin,
}

impl Product {
    pub fn from_local(product: LocalProduct) -> Self {
        Self {
            id: UnifiedId::Local(product.id),
            name: product.name,
            price: product.price,
            image: product.image,
            description: product.description,
            category: project_category(product.category),
            origin: ProductOrigin::Local,
        }
    }

    /// Projects an upstream record under an already validated native id.
    pub fn from_external(id: ExternalProductId, record: ExternalProductRecord) -> Self {
        let price = match json_decimal(&record.price) {
            Some(price) if !price.is_sign_negative() || price.is_zero() => price,
            _ => {
                debug!(
                    event_name = "catalog.external.price_clamped",
                    native_id = id.get(),
                    price = %record.price,
                    "external product price is not a non-negative number; using zero"
                );
                Decimal::ZERO
            }
        };
        Self {
            id: UnifiedId::External(id),
            name: record.title.unwrap_or_default(),
            price,
            image: record.thumbnail.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            category: project_category(record.category),
            origin: ProductOrigin::External,
        }
    }
}

fn project_category(category: Option<String>) -> String {
    category
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// A merchant-owned product as persisted by the local store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalProduct {
    pub id: LocalProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Product as served by the external catalog. Fields are kept loose because
/// the upstream is not under our control; `id` in particular is validated
/// by the identity mapper before the record is projected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalProductRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Validated payload for creating a local product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewProductRequest {
    pub fn validate(self) -> Result<NewProduct, CatalogError> {
        let name = required_text("name", self.name)?;
        let image = required_text("image", self.image)?;
        let description = required_text("description", self.description)?;
        let category = required_text("category", self.category)?;

        if self.price.is_null() {
            return Err(CatalogError::Validation("missing product field `price`".to_string()));
        }
        let price = json_decimal(&self.price).ok_or_else(|| {
            let message = if looks_numeric(&self.price) {
                "product field `price` is out of range"
            } else {
                "product field `price` must be a number"
            };
            CatalogError::Validation(message.to_string())
        })?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CatalogError::Validation(
                "product field `price` must not be negative".to_string(),
            ));
        }

        Ok(NewProduct { name, price, image, description, category })
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, CatalogError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CatalogError::Validation(format!("missing product field `{field}`"))),
    }
}

/// Reads a decimal from a JSON number or numeric string.
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)).ok()
}

fn looks_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => text.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

/// One entry of a caller-supplied purchase history. Only the id is read,
/// normalized to its string form so `1005` and `"1005"` compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PurchaseHistoryItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(match number.as_f64() {
            // `1005.0` names the same product as `1005`.
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() < 9.0e15 =>
            {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        }),
        other => Err(serde::de::Error::custom(format!(
            "history id must be a string or number, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn local_fixture(category: Option<&str>) -> LocalProduct {
        LocalProduct {
            id: LocalProductId("abc123".to_string()),
            name: "Mug".to_string(),
            price: Decimal::new(10, 0),
            image: "https://img.example/mug.png".to_string(),
            description: "Stoneware".to_string(),
            category: category.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn generated_local_ids_parse_back_and_never_look_numeric() {
        let id = LocalProductId::generate();

        assert_eq!(LocalProductId::parse(id.as_str()), Some(id.clone()));
        assert!(id.as_str().parse::<i64>().is_err());
    }

    #[test]
    fn local_id_parse_rejects_non_canonical_shapes() {
        assert!(LocalProductId::parse("1005").is_none());
        assert!(LocalProductId::parse("not-a-key").is_none());
        assert!(LocalProductId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8").is_none());
        assert!(LocalProductId::parse("67e5504410b1426f9247bb680e5fe0c8").is_none());
        assert!(LocalProductId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").is_some());
    }

    #[test]
    fn external_id_accepts_only_known_range() {
        assert!(ExternalProductId::new(0).is_none());
        assert!(ExternalProductId::new(-3).is_none());
        assert!(ExternalProductId::new(101).is_none());
        assert_eq!(ExternalProductId::new(1).map(ExternalProductId::get), Some(1));
        assert_eq!(ExternalProductId::new(100).map(ExternalProductId::get), Some(100));
    }

    #[test]
    fn unified_id_renders_wire_strings() {
        let external = UnifiedId::External(ExternalProductId::new(5).expect("in range"));
        let local = UnifiedId::Local(LocalProductId("abc123".to_string()));

        assert_eq!(external.to_string(), "1005");
        assert_eq!(local.to_string(), "abc123");
        assert_eq!(serde_json::to_value(&external).expect("serialize"), json!("1005"));
    }

    #[test]
    fn missing_or_empty_category_projects_to_fallback() {
        assert_eq!(Product::from_local(local_fixture(None)).category, FALLBACK_CATEGORY);
        assert_eq!(Product::from_local(local_fixture(Some(""))).category, FALLBACK_CATEGORY);
        assert_eq!(Product::from_local(local_fixture(Some("Kitchen"))).category, "Kitchen");

        let record = ExternalProductRecord { id: json!(7), ..ExternalProductRecord::default() };
        let product =
            Product::from_external(ExternalProductId::new(7).expect("in range"), record);
        assert_eq!(product.category, FALLBACK_CATEGORY);
    }

    #[test]
    fn external_projection_maps_upstream_field_names() {
        let record: ExternalProductRecord = serde_json::from_value(json!({
            "id": 5,
            "title": "Shirt",
            "price": 19.99,
            "thumbnail": "https://cdn.example/shirt.png",
            "description": "Cotton",
            "category": "Clothing",
            "rating": 4.5
        }))
        .expect("record should decode");

        let product =
            Product::from_external(ExternalProductId::new(5).expect("in range"), record);

        assert_eq!(product.id.to_string(), "1005");
        assert_eq!(product.name, "Shirt");
        assert_eq!(product.price, Decimal::new(1999, 2));
        assert_eq!(product.image, "https://cdn.example/shirt.png");
        assert_eq!(product.origin, ProductOrigin::External);
    }

    #[test]
    fn product_serializes_price_as_number() {
        let payload =
            serde_json::to_value(Product::from_local(local_fixture(Some("Kitchen"))))
                .expect("json");

        assert_eq!(payload["id"], json!("abc123"));
        assert_eq!(payload["price"], json!(10.0));
        assert_eq!(payload["origin"], json!("local"));
    }

    #[test]
    fn new_product_request_requires_every_field() {
        let request: NewProductRequest = serde_json::from_value(json!({
            "name": "Mug",
            "price": "12.50",
            "image": "https://img.example/mug.png",
            "description": "Stoneware",
        }))
        .expect("decode");

        let error = request.validate().expect_err("category is missing");
        assert_eq!(error, CatalogError::Validation("missing product field `category`".to_string()));
    }

    #[test]
    fn new_product_request_accepts_numeric_string_price() {
        let request: NewProductRequest = serde_json::from_value(json!({
            "name": "Mug",
            "price": "12.50",
            "image": "https://img.example/mug.png",
            "description": "Stoneware",
            "category": "Kitchen",
        }))
        .expect("decode");

        let product = request.validate().expect("valid request");
        assert_eq!(product.price, Decimal::new(1250, 2));
    }

    #[test]
    fn new_product_request_rejects_bad_prices() {
        for price in [json!("twelve"), json!(-1), json!(true)] {
            let request = NewProductRequest {
                name: Some("Mug".to_string()),
                price,
                image: Some("img".to_string()),
                description: Some("desc".to_string()),
                category: Some("Kitchen".to_string()),
            };
            assert!(matches!(request.validate(), Err(CatalogError::Validation(_))));
        }
    }

    #[test]
    fn history_ids_are_string_normalized() {
        let items: Vec<PurchaseHistoryItem> =
            serde_json::from_value(json!([{ "id": 1005 }, { "id": "abc123", "qty": 2 }]))
                .expect("decode history");

        assert_eq!(items[0].id, "1005");
        assert_eq!(items[1].id, "abc123");
    }

    #[test]
    fn integral_float_history_ids_normalize_to_integers() {
        let items: Vec<PurchaseHistoryItem> =
            serde_json::from_value(json!([{ "id": 1005.0 }, { "id": 7.5 }, { "id": -3.0 }]))
                .expect("decode history");

        assert_eq!(items[0].id, "1005");
        assert_eq!(items[1].id, "7.5");
        assert_eq!(items[2].id, "-3");
    }

    #[test]
    fn unusable_external_prices_project_to_zero() {
        for price in [json!(-4.5), json!("cheap"), json!(null)] {
            let record =
                ExternalProductRecord { id: json!(3), price, ..ExternalProductRecord::default() };
            let product =
                Product::from_external(ExternalProductId::new(3).expect("in range"), record);
            assert_eq!(product.price, Decimal::ZERO);
        }

        let record = ExternalProductRecord {
            id: json!(3),
            price: json!(12.5),
            ..ExternalProductRecord::default()
        };
        let product = Product::from_external(ExternalProductId::new(3).expect("in range"), record);
        assert_eq!(product.price, Decimal::new(125, 1));
    }

    #[test]
    fn unrepresentable_prices_are_reported_as_out_of_range() {
        for price in [json!(1e-300), json!("1e300")] {
            let request = NewProductRequest {
                name: Some("Mug".to_string()),
                price,
                image: Some("img".to_string()),
                description: Some("desc".to_string()),
                category: Some("Kitchen".to_string()),
            };
            assert_eq!(
                request.validate(),
                Err(CatalogError::Validation("product field `price` is out of range".to_string()))
            );
        }
    }
}
