// JWT validation for store owners
//
// Tokens are issued by the account service; this API only verifies them.

use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owner user id
    pub sub: Uuid,
    pub email: String,
    /// Subscription plan tag at issue time
    #[serde(default)]
    pub plan: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}
