use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::models::user;

/// SHA-256 hash a token for safe at-rest storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented reset token against the digest stored on the user row.
///
/// The stored digest must match and the stored expiration must be in the
/// future; a cleared, superseded, or expired entry rejects the token even
/// when its own signature still verifies.
pub fn validate_stored_token(user: &user::Model, presented: &str) -> Result<(), AuthError> {
    let (stored, expiration) = match (&user.reset_token, user.reset_token_expiration) {
        (Some(stored), Some(expiration)) => (stored, expiration),
        _ => return Err(AuthError::InvalidResetToken),
    };

    if *stored != hash_token(presented) {
        return Err(AuthError::InvalidResetToken);
    }

    if expiration < Utc::now().naive_utc() {
        return Err(AuthError::InvalidResetToken);
    }

    Ok(())
}
