// HTTP handlers for the sales dashboard

use axum::{
    extract::{Query, State},
    Json,
};

use crate::analytics::models::{
    Dashboard, DashboardQuery, MonthSummary, MonthlyQuery, PaginatedDashboard, SalesMetrics,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::orders::query::{OrderQueryParams, OrderQueryValidator};
use crate::AppState;

/// Handler for GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Totals and orders", body = Dashboard),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = state
        .analytics_service
        .dashboard(user.user_id, query.from, query.to)
        .await?;
    Ok(Json(dashboard))
}

/// Handler for GET /api/dashboard/paginated
#[utoipa::path(
    get,
    path = "/api/dashboard/paginated",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100"),
        ("search" = Option<String>, Query, description = "Customer name substring"),
        ("status" = Option<String>, Query, description = "Exact status"),
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "One page of orders", body = PaginatedDashboard),
        (status = 400, description = "Invalid filters")
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn dashboard_paginated_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<OrderQueryParams>,
) -> Result<Json<PaginatedDashboard>, ApiError> {
    tracing::debug!("Paginated dashboard with parameters: {:?}", params);
    let filters = OrderQueryValidator::validate(params)?;

    let page = state
        .analytics_service
        .dashboard_paginated(user.user_id, &filters)
        .await?;
    Ok(Json(page))
}

/// Handler for GET /api/dashboard/metrics
#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    params(
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Current period against the previous one", body = SalesMetrics)
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn metrics_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<SalesMetrics>, ApiError> {
    let metrics = state
        .analytics_service
        .metrics(user.user_id, query.from, query.to)
        .await?;
    Ok(Json(metrics))
}

/// Handler for GET /api/dashboard/monthly
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly",
    params(
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to the current one")
    ),
    responses(
        (status = 200, description = "Twelve months of approved revenue", body = Vec<MonthSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn monthly_summary_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<Vec<MonthSummary>>, ApiError> {
    let months = state
        .analytics_service
        .monthly_summary_for_owner(user.user_id, query.year)
        .await?;
    Ok(Json(months))
}
