use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revoked token entity - append-only ledger of invalidated tokens.
///
/// A row for a given `token_id` means that token is rejected regardless
/// of its embedded expiry. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revoked_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The `jti` claim of the revoked token
    #[sea_orm(unique)]
    pub token_id: String,

    /// "access" or "refresh"
    pub token_kind: String,

    /// The user the token was issued to
    pub user_id: i32,

    pub revoked_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
