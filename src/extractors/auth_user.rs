use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::DatabaseConnection;

use crate::auth::jwt::{self, TokenKind};
use crate::auth::revocation;
use crate::config::Config;
use crate::error::AuthError;

/// Extractor that authenticates the bearer access token.
///
/// Verifies signature, expiry, and kind, then rejects identifiers present
/// in the revocation ledger. Handlers receive the caller's user id and the
/// token's revocation key.
///
/// ```rust,ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     // user.user_id, user.token_id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub token_id: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AuthError::InvalidToken("Missing Authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AuthError::InvalidToken("Invalid Authorization header format".to_string())
        })?;

        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| AuthError::Internal("Config not found in request".to_string()))?;

        let verified = jwt::verify_token(token, TokenKind::Access, &config.jwt_secret)?;

        let db = parts
            .extensions
            .get::<DatabaseConnection>()
            .ok_or_else(|| AuthError::Internal("Database not found in request".to_string()))?;

        if revocation::is_revoked(db, &verified.token_id).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(AuthUser {
            user_id: verified.user_id,
            token_id: verified.token_id,
        })
    }
}
