// Bearer token errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        warn!("Rejected bearer token: {}", self);

        let body = Json(json!({
            "error_code": "UNAUTHORIZED",
            "message": self.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
