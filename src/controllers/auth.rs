use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::jwt::VerifiedToken;
use crate::auth::service::{self, AuthTokens, LoginRequest, PasswordResetConfirm, SignupRequest};
use crate::error::AuthError;
use crate::extractors::{AuthUser, Json};
use crate::models::user::{Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the access token
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_revoked: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetRequestPayload {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/password-reset/request", post(password_reset_request))
        .route("/password-reset/confirm", post(password_reset_confirm))
        .route("/me", get(me))
}

// ── Handlers ──

/// Sign up a new user.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid admin code"),
        (status = 409, description = "Email or username already registered"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), AuthError> {
    let user = service::signup(&state.db, &state.config, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(user.into())))
}

/// Log in with existing credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthTokens>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthTokens>, AuthError> {
    let tokens = service::login(&state.db, &state.config, payload).await?;
    Ok(ApiResponse::success(tokens))
}

/// Mint a new access token from a refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Invalid, expired, or revoked refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse<RefreshResponse>, AuthError> {
    let access_token = service::refresh(&state.db, &state.config, &payload.refresh_token).await?;
    Ok(ApiResponse::success(RefreshResponse { access_token }))
}

/// Logout: revoke the current access token, best-effort revoke a
/// supplied refresh token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<LogoutResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Option<Json<LogoutRequest>>,
) -> Result<ApiResponse<LogoutResponse>, AuthError> {
    let access = VerifiedToken {
        user_id: user.user_id,
        token_id: user.token_id,
    };
    let refresh_token = payload.and_then(|Json(p)| p.refresh_token);

    let outcome =
        service::logout(&state.db, &state.config, &access, refresh_token.as_deref()).await?;

    Ok(ApiResponse::success(LogoutResponse {
        status: "logged out".to_string(),
        refresh_token_revoked: outcome.refresh_token_revoked,
    }))
}

/// Request a password reset token for an email address.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    request_body = PasswordResetRequestPayload,
    responses(
        (status = 200, description = "Reset token created and dispatched", body = ApiResponse<MessageResponse>),
        (status = 404, description = "No account with this email")
    ),
    tag = "auth"
)]
pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequestPayload>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    service::request_password_reset(&state.db, &state.config, state.mailer.as_ref(), &payload.email)
        .await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "A password reset token has been sent to your email".to_string(),
    }))
}

/// Confirm a password reset with a token and a new password.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid or expired reset token"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirm>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    service::confirm_password_reset(&state.db, &state.config, payload).await?;
    Ok(ApiResponse::success(MessageResponse {
        message: "Password has been reset successfully. Please log in again.".to_string(),
    }))
}

/// Return the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<UserResponse>, AuthError> {
    let user_model = User::find_by_id(user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(user_model.into()))
}
