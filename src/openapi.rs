use utoipa::OpenApi;

use crate::auth::service::{AuthTokens, LoginRequest, PasswordResetConfirm, SignupRequest};
use crate::controllers::auth::{
    LogoutRequest, LogoutResponse, MessageResponse, PasswordResetRequestPayload, RefreshRequest,
    RefreshResponse,
};
use crate::models::user::UserResponse;

/// OpenAPI documentation for the ExamBook auth API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ExamBook Auth API",
        version = "0.1.0",
        description = "Authentication core for the ExamBook examination platform."
    ),
    paths(
        crate::controllers::auth::signup,
        crate::controllers::auth::login,
        crate::controllers::auth::refresh,
        crate::controllers::auth::logout,
        crate::controllers::auth::password_reset_request,
        crate::controllers::auth::password_reset_confirm,
        crate::controllers::auth::me,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            AuthTokens,
            RefreshRequest,
            RefreshResponse,
            LogoutRequest,
            LogoutResponse,
            PasswordResetRequestPayload,
            PasswordResetConfirm,
            MessageResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
