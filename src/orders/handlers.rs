// HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::orders::models::{CreateOrderRequest, Order, OrderDetails, UpdateStatusRequest};
use crate::orders::OrderError;
use crate::validation::validate_subdomain;
use crate::AppState;

/// Handler for POST /api/orders
/// Records a sale for the authenticated owner's store
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderDetails),
        (status = 400, description = "Invalid input or insufficient stock"),
        (status = 403, description = "Monthly order quota reached or product of another store"),
        (status = 404, description = "Store or product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    tracing::debug!("Creating order for owner {}", user.user_id);
    request.validate()?;

    let status = request.status.clone();
    let details = state
        .order_service
        .create_order(request, user.user_id, status, user.plan)
        .await?;

    Ok((StatusCode::CREATED, Json(details)))
}

/// Handler for POST /api/stores/:subdomain/orders
/// Public checkout; the order starts as pending
#[utoipa::path(
    post,
    path = "/api/stores/{subdomain}/orders",
    params(
        ("subdomain" = String, Path, description = "Public store subdomain")
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderDetails),
        (status = 400, description = "Invalid input or insufficient stock"),
        (status = 404, description = "Store or product not found")
    ),
    tag = "orders"
)]
pub async fn create_online_order_handler(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    tracing::debug!("Online order for store '{}'", subdomain);

    if validate_subdomain(&subdomain).is_err() {
        tracing::debug!("Rejected malformed subdomain '{}'", subdomain);
        return Err(OrderError::StoreNotFound.into());
    }
    request.validate()?;

    let details = state
        .order_service
        .create_online_order(request, &subdomain)
        .await?;

    Ok((StatusCode::CREATED, Json(details)))
}

/// Handler for PATCH /api/orders/:id/status
/// Overwrites the status; any non-empty value is accepted
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 403, description = "Order belongs to another store"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    request.validate()?;

    let order = state
        .order_service
        .update_order_status(order_id, user.user_id, &request.status)
        .await?;

    Ok(Json(order))
}

/// Handler for DELETE /api/orders/:id
/// Deletes the order and puts its quantities back into stock
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Order belongs to another store"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .order_service
        .delete_order(order_id, user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/orders/recent
#[utoipa::path(
    get,
    path = "/api/orders/recent",
    responses(
        (status = 200, description = "Three most recent orders, newest first", body = Vec<Order>),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn recent_sales_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.order_service.recent_sales(user.user_id).await?;
    Ok(Json(orders))
}
