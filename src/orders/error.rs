use serde::Serialize;
use uuid::Uuid;

use crate::plans::Plan;

/// What a quota limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaResource {
    MonthlyOrders,
    Products,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaResource::MonthlyOrders => write!(f, "monthly orders"),
            QuotaResource::Products => write!(f, "products"),
        }
    }
}

/// Error types for order placement and inventory reconciliation
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Store not found")]
    StoreNotFound,

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Catalog product not found: {0}")]
    CatalogProductNotFound(i64),

    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        name: String,
        available: i32,
        requested: i32,
    },

    #[error("Order not found")]
    OrderNotFound,

    #[error("{resource} does not belong to your store")]
    OwnershipMismatch { resource: &'static str },

    #[error("You reached the limit of {limit} {resource} of the {plan} plan. Upgrade to continue")]
    QuotaExceeded {
        plan: Plan,
        limit: i64,
        resource: QuotaResource,
    },

    #[error("Catalog product {0} was already added to this store")]
    AlreadyAdded(i64),

    #[error("Validation error: {0}")]
    ValidationFailure(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Stable discriminant of an [`OrderError`], used for status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    StoreNotFound,
    ProductNotFound,
    InsufficientStock,
    OrderNotFound,
    OwnershipMismatch,
    QuotaExceeded,
    Conflict,
    ValidationFailure,
    Database,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::StoreNotFound => "STORE_NOT_FOUND",
            ErrorKind::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorKind::OwnershipMismatch => "OWNERSHIP_MISMATCH",
            ErrorKind::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::ValidationFailure => "VALIDATION_FAILURE",
            ErrorKind::Database => "DATABASE_ERROR",
        }
    }
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::StoreNotFound => ErrorKind::StoreNotFound,
            OrderError::ProductNotFound(_) | OrderError::CatalogProductNotFound(_) => {
                ErrorKind::ProductNotFound
            }
            OrderError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            OrderError::OrderNotFound => ErrorKind::OrderNotFound,
            OrderError::OwnershipMismatch { .. } => ErrorKind::OwnershipMismatch,
            OrderError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            OrderError::AlreadyAdded(_) => ErrorKind::Conflict,
            OrderError::ValidationFailure(_) => ErrorKind::ValidationFailure,
            OrderError::DatabaseError(_) => ErrorKind::Database,
        }
    }

    /// Structured fields worth returning to the client alongside the message
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            OrderError::InsufficientStock {
                product_id,
                name,
                available,
                requested,
            } => Some(serde_json::json!({
                "product_id": product_id,
                "name": name,
                "available": available,
                "requested": requested,
            })),
            OrderError::QuotaExceeded {
                plan,
                limit,
                resource,
            } => Some(serde_json::json!({
                "plan": plan,
                "limit": limit,
                "resource": resource,
            })),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}
