//! Auth workflow orchestrator.
//!
//! Each function is one request intent: it consults the credential store
//! and the hashing service, mints or validates tokens, updates the
//! revocation ledger, and returns a typed outcome. Handlers stay thin.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::jwt::{self, TokenKind, VerifiedToken};
use crate::auth::reset;
use crate::auth::revocation;
use crate::auth::{hash_password, verify_password};
use crate::config::Config;
use crate::error::AuthError;
use crate::mail::{MailMessage, Mailer};
use crate::models::user::{self, Entity as User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Privileged registration code; a correct value creates an admin user
    pub admin_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Outcome of a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub is_admin: bool,
}

/// Outcome of a logout. The access token is always revoked by the time
/// this is returned; `refresh_token_revoked` reports the best-effort
/// revocation of a refresh token supplied alongside it.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_revoked: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Register a new user.
pub async fn signup(
    db: &DatabaseConnection,
    config: &Config,
    req: SignupRequest,
) -> Result<user::Model, AuthError> {
    if req.email.is_empty() || req.username.is_empty() || req.password.is_empty() {
        return Err(AuthError::Validation(
            "Email, username, and password are required".to_string(),
        ));
    }

    if req.password.len() < config.min_password_length {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            config.min_password_length
        )));
    }

    // A wrong admin code rejects the whole signup before any row exists.
    let is_admin = match req.admin_code.as_deref() {
        None => false,
        Some(code) if code == config.admin_code => true,
        Some(_) => return Err(AuthError::InvalidAdminCode),
    };

    let existing = User::find()
        .filter(
            user::Column::Email
                .eq(&req.email)
                .or(user::Column::Username.eq(&req.username)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AuthError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let now = Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        username: Set(req.username),
        email: Set(req.email),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        reset_token: Set(None),
        reset_token_expiration: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // Concurrent signups race to the store's unique constraints; the
    // loser surfaces as a conflict, not an internal error.
    let user_model = match new_user.insert(db).await {
        Ok(m) => m,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AuthError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user_model.id, is_admin, "user registered");
    Ok(user_model)
}

/// Verify credentials and mint an access + refresh token pair.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    req: LoginRequest,
) -> Result<AuthTokens, AuthError> {
    // Unknown email and wrong password are indistinguishable to the caller.
    let user_model = User::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(db)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&req.password, &user_model.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let access_token =
        jwt::issue_access_token(user_model.id, &config.jwt_secret, config.access_token_expiry_mins)?;
    let refresh_token = jwt::issue_refresh_token(
        user_model.id,
        &config.jwt_secret,
        config.refresh_token_expiry_days,
    )?;

    tracing::info!(user_id = user_model.id, "login succeeded");

    Ok(AuthTokens {
        access_token,
        refresh_token,
        is_admin: user_model.is_admin,
    })
}

/// Mint a new access token from a valid, unrevoked refresh token.
///
/// The refresh token itself is not rotated.
pub async fn refresh(
    db: &DatabaseConnection,
    config: &Config,
    refresh_token: &str,
) -> Result<String, AuthError> {
    let verified = jwt::verify_token(refresh_token, TokenKind::Refresh, &config.jwt_secret)?;

    if revocation::is_revoked(db, &verified.token_id).await? {
        return Err(AuthError::TokenRevoked);
    }

    jwt::issue_access_token(verified.user_id, &config.jwt_secret, config.access_token_expiry_mins)
}

/// Revoke the authenticated access token and, best-effort, a refresh
/// token supplied alongside it.
///
/// The access revocation is never rolled back: a refresh token that fails
/// verification is reported in the outcome instead of aborting.
pub async fn logout(
    db: &DatabaseConnection,
    config: &Config,
    access: &VerifiedToken,
    refresh_token: Option<&str>,
) -> Result<LogoutOutcome, AuthError> {
    revocation::revoke(db, &access.token_id, TokenKind::Access, access.user_id).await?;

    let refresh_token_revoked = match refresh_token {
        None => None,
        Some(raw) => match jwt::verify_token(raw, TokenKind::Refresh, &config.jwt_secret) {
            Ok(verified) => {
                revocation::revoke(db, &verified.token_id, TokenKind::Refresh, verified.user_id)
                    .await?;
                Some(true)
            }
            Err(e) => {
                tracing::warn!(user_id = access.user_id, error = %e,
                    "refresh token revocation failed during logout");
                Some(false)
            }
        },
    };

    Ok(LogoutOutcome {
        refresh_token_revoked,
    })
}

/// Issue a reset token for the account with the given email, persist its
/// digest and expiry, and dispatch one notification.
pub async fn request_password_reset(
    db: &DatabaseConnection,
    config: &Config,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), AuthError> {
    let user_model = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| AuthError::NotFound("No account with this email".to_string()))?;

    let token =
        jwt::issue_reset_token(user_model.id, &config.jwt_secret, config.reset_token_expiry_secs)?;
    let expiration =
        Utc::now().naive_utc() + Duration::seconds(config.reset_token_expiry_secs as i64);

    let user_id = user_model.id;
    let recipient = user_model.email.clone();

    let mut active: user::ActiveModel = user_model.into();
    active.reset_token = Set(Some(reset::hash_token(&token)));
    active.reset_token_expiration = Set(Some(expiration));
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;

    let message = MailMessage {
        to: recipient,
        subject: "ExamBook password reset".to_string(),
        body: format!(
            "Use the token below to reset your password (valid for 1 hour):\n\n{}\n",
            token
        ),
    };

    // The token and expiry are already persisted; delivery failure is
    // logged, never surfaced.
    if let Err(e) = mailer.send(&message).await {
        tracing::error!(user_id, error = %e, "failed to dispatch password reset mail");
    }

    tracing::info!(user_id, "password reset requested");
    Ok(())
}

/// Set a new password from a valid reset token.
///
/// The presented token must verify as a signed reset token AND match the
/// digest currently stored on the user row with its stored expiration in
/// the future. Both reset fields are cleared on success, consuming the
/// token set as a whole.
pub async fn confirm_password_reset(
    db: &DatabaseConnection,
    config: &Config,
    req: PasswordResetConfirm,
) -> Result<(), AuthError> {
    if req.new_password.len() < config.min_password_length {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            config.min_password_length
        )));
    }

    let user_id =
        jwt::verify_reset_token(&req.token, &config.jwt_secret).ok_or(AuthError::InvalidResetToken)?;

    let user_model = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    reset::validate_stored_token(&user_model, &req.token)?;

    let new_hash = hash_password(&req.new_password)?;
    let mut active: user::ActiveModel = user_model.into();
    active.password_hash = Set(new_hash);
    active.reset_token = Set(None);
    active.reset_token_expiration = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;

    tracing::info!(user_id, "password reset confirmed");
    Ok(())
}
