// HTTP handler for plan usage

use axum::{extract::State, Json};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::orders::error::OrderError;
use crate::plans::usage::UsageInfo;
use crate::AppState;

/// Handler for GET /api/plan/usage
/// Limits, current usage and headroom of the owner's store plan
#[utoipa::path(
    get,
    path = "/api/plan/usage",
    responses(
        (status = 200, description = "Plan limits and usage"),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "plan"
)]
pub async fn plan_usage_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UsageInfo>, ApiError> {
    let store = state
        .stores
        .find_by_owner(user.user_id)
        .await?
        .ok_or(OrderError::StoreNotFound)?;

    let info = state.plan_limits.usage_info(store.id, store.plan()).await?;
    Ok(Json(info))
}
