use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// The two kinds of session token this service issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims payload for access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Token identifier, the revocation key
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Access or refresh
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Claims payload for password reset tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// The identity extracted from a successfully verified token.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: i32,
    pub token_id: String,
}

fn issue_token(
    user_id: i32,
    kind: TokenKind,
    secret: &str,
    lifetime: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires = now + lifetime;

    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
        kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Failed to create token: {}", e)))
}

/// Create a short-lived access token for a user.
pub fn issue_access_token(
    user_id: i32,
    secret: &str,
    expiry_mins: u64,
) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenKind::Access,
        secret,
        Duration::minutes(expiry_mins as i64),
    )
}

/// Create a long-lived refresh token for a user.
pub fn issue_refresh_token(
    user_id: i32,
    secret: &str,
    expiry_days: u64,
) -> Result<String, AuthError> {
    issue_token(
        user_id,
        TokenKind::Refresh,
        secret,
        Duration::days(expiry_days as i64),
    )
}

/// Verify a token's signature, expiry, and kind.
///
/// Does not consult the revocation ledger; composing that check after
/// verification belongs to the caller.
pub fn verify_token(
    token: &str,
    required: TokenKind,
    secret: &str,
) -> Result<VerifiedToken, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken(e.to_string()),
    })?;

    let claims = token_data.claims;
    if claims.kind != required {
        return Err(AuthError::WrongTokenType);
    }

    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidToken("Invalid subject claim".to_string()))?;

    Ok(VerifiedToken {
        user_id,
        token_id: claims.jti,
    })
}

/// Create a password reset token with a fixed short lifetime.
pub fn issue_reset_token(
    user_id: i32,
    secret: &str,
    expiry_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires = now + Duration::seconds(expiry_secs as i64);

    let claims = ResetClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Failed to create reset token: {}", e)))
}

/// Verify a password reset token, returning the embedded user id.
///
/// Returns `None` on any signature failure or expiry; callers treat both
/// uniformly as "invalid or expired".
pub fn verify_reset_token(token: &str, secret: &str) -> Option<i32> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data =
        decode::<ResetClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .ok()?;

    token_data.claims.sub.parse().ok()
}
