use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::inventory::models::{ProductRef, ProductType};

/// Status given to an online order on creation
pub const STATUS_PENDING: &str = "pending";
/// Status given to a staff-entered sale when the caller supplies none
pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_DELIVERED: &str = "delivered";

/// Order status is an open string; revenue only counts "approved" in any casing
pub fn is_approved(status: &str) -> bool {
    status.eq_ignore_ascii_case("approved")
}

/// Domain model representing an order in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub store_id: Uuid,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub payment_method: String,
    /// Minor units
    pub total: i64,
    pub is_delivery: bool,
    pub delivery_street: Option<String>,
    pub delivery_number: Option<String>,
    pub delivery_neighborhood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model representing an item within an order
///
/// Name, image and unit price are captured when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_type: ProductType,
    pub store_product_id: Option<Uuid>,
    pub store_product_custom_id: Option<Uuid>,
    pub name: String,
    pub img_url: Option<String>,
    /// Unit price in minor units
    pub price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn product_ref(&self) -> Option<ProductRef> {
        ProductRef::from_parts(
            self.product_type,
            self.store_product_id,
            self.store_product_custom_id,
        )
    }

    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

/// An order together with its items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Row data for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub store_id: Uuid,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub payment_method: String,
    pub total: i64,
    pub is_delivery: bool,
    pub delivery_street: Option<String>,
    pub delivery_number: Option<String>,
    pub delivery_neighborhood: Option<String>,
    /// Backdated creation time for imported sales, `None` for now
    pub created_at: Option<DateTime<Utc>>,
}

/// Row data for a new order item, already priced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_ref: ProductRef,
    pub name: String,
    pub img_url: Option<String>,
    pub price: i64,
    pub quantity: i32,
}

impl NewOrderItem {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

/// One requested line of an order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub store_product_id: Uuid,
    pub quantity: i32,
}

/// Request DTO for creating an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Initial status for staff sales, ignored on the online channel
    pub status: Option<String>,
    /// Backdated creation time for imported sales
    pub created_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Order must have at least one item"))]
    pub items: Vec<OrderLineRequest>,
    /// Total priced by the client, minor units; overrides the computed total
    pub total: Option<i64>,
    #[serde(default)]
    pub is_delivery: bool,
    pub delivery_street: Option<String>,
    pub delivery_number: Option<String>,
    pub delivery_neighborhood: Option<String>,
}

/// Request DTO for updating order status
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}
