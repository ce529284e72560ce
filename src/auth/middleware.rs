// Bearer token extractor for owner-only routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{error::AuthError, token::TokenService};
use crate::plans::Plan;

/// Authenticated store owner
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    /// Plan carried by the token, if any
    pub plan: Option<Plan>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.validate_access_token(token)?;
        debug!("Authenticated owner {}", claims.sub);

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            plan: claims.plan.as_deref().map(Plan::parse),
        })
    }
}
