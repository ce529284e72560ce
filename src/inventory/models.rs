use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Which inventory a product lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Catalog,
    Custom,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Catalog => "catalog",
            ProductType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product reference whose owning inventory is already known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ProductRef {
    Catalog(Uuid),
    Custom(Uuid),
}

impl ProductRef {
    pub fn id(&self) -> Uuid {
        match self {
            ProductRef::Catalog(id) | ProductRef::Custom(id) => *id,
        }
    }

    pub fn product_type(&self) -> ProductType {
        match self {
            ProductRef::Catalog(_) => ProductType::Catalog,
            ProductRef::Custom(_) => ProductType::Custom,
        }
    }

    /// Rebuild a reference from the discriminator and nullable columns of an order item
    pub fn from_parts(
        product_type: ProductType,
        store_product_id: Option<Uuid>,
        store_product_custom_id: Option<Uuid>,
    ) -> Option<Self> {
        match product_type {
            ProductType::Catalog => store_product_id.map(ProductRef::Catalog),
            ProductType::Custom => store_product_custom_id.map(ProductRef::Custom),
        }
    }
}

/// Shared catalog template, read-only here
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogProduct {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub company: String,
    pub category: Option<String>,
    /// Minor units
    pub normal_price: i64,
    /// Minor units
    pub suggested_price: i64,
    pub barcode: Option<String>,
    pub img_url: Option<String>,
}

/// A store's stocked instance of a catalog product
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    pub id: Uuid,
    pub store_id: Uuid,
    pub catalog_id: i64,
    pub name: String,
    pub brand: String,
    pub company: String,
    pub category: Option<String>,
    pub img_url: Option<String>,
    /// Selling price chosen by the store, minor units
    pub price: i64,
    /// Catalog normal price captured when the product was added, minor units
    pub catalog_price: i64,
    pub quantity: i32,
    pub cost_price: Option<i64>,
    pub validity_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreProduct {
    pub fn on_sale(&self) -> bool {
        self.price < self.catalog_price
    }
}

/// A store-authored product without catalog backing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreProductCustom {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub category: Option<String>,
    pub img_url: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub cost_price: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const STATUS_ACTIVE: &str = "Active";

/// Row data for a new catalog-linked product
#[derive(Debug, Clone)]
pub struct NewStoreProduct {
    pub store_id: Uuid,
    pub catalog_id: i64,
    pub name: String,
    pub brand: String,
    pub company: String,
    pub category: Option<String>,
    pub img_url: Option<String>,
    pub price: i64,
    pub catalog_price: i64,
    pub quantity: i32,
    pub cost_price: Option<i64>,
    pub validity_date: Option<NaiveDate>,
}

/// Request DTO for adding a catalog product to a store
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCatalogProductRequest {
    pub catalog_id: i64,
    /// Selling price in minor units, defaults to the catalog suggested price
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Cost price cannot be negative"))]
    pub cost_price: Option<i64>,
    pub validity_date: Option<NaiveDate>,
}

/// Request DTO for creating a custom product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub company: Option<String>,
    pub category: Option<String>,
    pub img_url: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Cost price cannot be negative"))]
    pub cost_price: Option<i64>,
}

/// Row data for a new custom product
#[derive(Debug, Clone)]
pub struct NewCustomProduct {
    pub store_id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub category: Option<String>,
    pub img_url: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub cost_price: Option<i64>,
}
