// HTTP handlers for stocking products

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::inventory::models::{
    AddCatalogProductRequest, CreateCustomProductRequest, StoreProduct, StoreProductCustom,
};
use crate::AppState;

/// Handler for POST /api/products/catalog
#[utoipa::path(
    post,
    path = "/api/products/catalog",
    request_body = AddCatalogProductRequest,
    responses(
        (status = 201, description = "Catalog product added to the store", body = StoreProduct),
        (status = 403, description = "Product quota reached"),
        (status = 404, description = "Catalog product not found"),
        (status = 409, description = "Already added to this store")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn add_catalog_product_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AddCatalogProductRequest>,
) -> Result<(StatusCode, Json<StoreProduct>), ApiError> {
    request.validate()?;

    let product = state
        .product_service
        .add_catalog_product(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for POST /api/products/custom
#[utoipa::path(
    post,
    path = "/api/products/custom",
    request_body = CreateCustomProductRequest,
    responses(
        (status = 201, description = "Custom product created", body = StoreProductCustom),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Product quota reached")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_custom_product_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCustomProductRequest>,
) -> Result<(StatusCode, Json<StoreProductCustom>), ApiError> {
    request.validate()?;

    let product = state
        .product_service
        .create_custom_product(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}
