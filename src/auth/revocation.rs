use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};

use crate::auth::jwt::TokenKind;
use crate::error::AuthError;
use crate::models::revoked_token;

/// Record a token identifier as revoked.
///
/// Idempotent: an already-revoked identifier is a no-op, including one
/// inserted by a concurrent logout (the unique constraint on `token_id`
/// resolves the race).
pub async fn revoke(
    db: &DatabaseConnection,
    token_id: &str,
    kind: TokenKind,
    user_id: i32,
) -> Result<(), AuthError> {
    if is_revoked(db, token_id).await? {
        return Ok(());
    }

    let model = revoked_token::ActiveModel {
        token_id: Set(token_id.to_string()),
        token_kind: Set(kind.to_string()),
        user_id: Set(user_id),
        revoked_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(_) => {
            tracing::info!(user_id, %kind, "token revoked");
            Ok(())
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Check whether a token identifier has been revoked.
pub async fn is_revoked(db: &DatabaseConnection, token_id: &str) -> Result<bool, AuthError> {
    let found = revoked_token::Entity::find()
        .filter(revoked_token::Column::TokenId.eq(token_id))
        .one(db)
        .await?;

    Ok(found.is_some())
}
