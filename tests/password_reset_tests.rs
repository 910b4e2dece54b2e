use async_trait::async_trait;
use exambook_auth::auth::service::{self, SignupRequest};
use exambook_auth::error::AuthError;
use exambook_auth::mail::{MailMessage, Mailer};
use exambook_auth::models::user::{self, Entity as User};
use exambook_auth::testing::{test_config, test_db};
use exambook_auth::TestApp;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

async fn user_by_email(db: &DatabaseConnection, email: &str) -> user::Model {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .unwrap()
        .expect("user not found")
}

/// The reset token is delivered as the last word of the mail body.
fn token_from(message: &MailMessage) -> String {
    message.body.split_whitespace().last().unwrap().to_string()
}

#[tokio::test]
async fn test_request_for_unknown_email_is_not_found() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/request"),
            &serde_json::json!({"email": "noone@example.com"}).to_string(),
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.error()["code"], "NOT_FOUND");
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_request_stores_token_and_dispatches_one_notification() {
    let app = TestApp::new().await;

    app.create_user("reset@example.com", "resetter", "password123")
        .await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/request"),
            &serde_json::json!({"email": "reset@example.com"}).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reset@example.com");
    assert!(!token_from(&sent[0]).is_empty());

    // Both reset fields are persisted together, with a future expiry.
    let user = user_by_email(&app.db, "reset@example.com").await;
    assert!(user.reset_token.is_some());
    let expiration = user.reset_token_expiration.expect("expiration not set");
    assert!(expiration > chrono::Utc::now().naive_utc());
}

#[tokio::test]
async fn test_confirm_sets_new_password_and_clears_token() {
    let app = TestApp::new().await;

    app.create_user("confirm@example.com", "confirmer", "password123")
        .await;
    app.client
        .post(
            &app.url("/api/auth/password-reset/request"),
            &serde_json::json!({"email": "confirm@example.com"}).to_string(),
        )
        .await;

    let token = token_from(&app.mailer.sent()[0]);

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": token, "new_password": "brand-new-pw"}).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);

    // Old password no longer works; the new one does.
    let old = app
        .client
        .post(
            &app.url("/api/auth/login"),
            &serde_json::json!({"email": "confirm@example.com", "password": "password123"})
                .to_string(),
        )
        .await;
    assert_eq!(old.status, 400);

    app.login("confirm@example.com", "brand-new-pw").await;

    // The token set is consumed as a whole.
    let user = user_by_email(&app.db, "confirm@example.com").await;
    assert!(user.reset_token.is_none());
    assert!(user.reset_token_expiration.is_none());
}

#[tokio::test]
async fn test_confirm_with_garbage_token() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": "garbage", "new_password": "brand-new-pw"}).to_string(),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.error()["code"], "INVALID_RESET_TOKEN");
}

#[tokio::test]
async fn test_consumed_token_cannot_be_replayed() {
    let app = TestApp::new().await;

    app.create_user("replay@example.com", "replayer", "password123")
        .await;
    app.client
        .post(
            &app.url("/api/auth/password-reset/request"),
            &serde_json::json!({"email": "replay@example.com"}).to_string(),
        )
        .await;

    let token = token_from(&app.mailer.sent()[0]);

    let first = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": token, "new_password": "first-new-pw"}).to_string(),
        )
        .await;
    assert_eq!(first.status, 200);

    // The signature is still valid, but the stored token set is gone.
    let second = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": token, "new_password": "second-new-pw"}).to_string(),
        )
        .await;
    assert_eq!(second.status, 400);
    assert_eq!(second.error()["code"], "INVALID_RESET_TOKEN");
}

#[tokio::test]
async fn test_second_request_supersedes_first_token() {
    let app = TestApp::new().await;

    app.create_user("super@example.com", "superseded", "password123")
        .await;

    for _ in 0..2 {
        app.client
            .post(
                &app.url("/api/auth/password-reset/request"),
                &serde_json::json!({"email": "super@example.com"}).to_string(),
            )
            .await;
    }

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    let first = token_from(&sent[0]);
    let second = token_from(&sent[1]);
    assert_ne!(first, second);

    // Only the most recently issued token matches the stored digest.
    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": first, "new_password": "brand-new-pw"}).to_string(),
        )
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": second, "new_password": "brand-new-pw"}).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_confirm_rejects_short_password() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/password-reset/confirm"),
            &serde_json::json!({"token": "whatever", "new_password": "123"}).to_string(),
        )
        .await;

    assert_eq!(res.status, 422);
    assert_eq!(res.error()["code"], "VALIDATION_ERROR");
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &MailMessage) -> Result<(), AuthError> {
        Err(AuthError::Internal("smtp unreachable".to_string()))
    }
}

#[tokio::test]
async fn test_mail_failure_does_not_fail_the_request() {
    let db = test_db().await;
    let config = test_config();

    service::signup(
        &db,
        &config,
        SignupRequest {
            username: "undelivered".to_string(),
            email: "undelivered@example.com".to_string(),
            password: "password123".to_string(),
            admin_code: None,
        },
    )
    .await
    .unwrap();

    // Delivery fails, the operation still succeeds and the token stands.
    service::request_password_reset(&db, &config, &FailingMailer, "undelivered@example.com")
        .await
        .unwrap();

    let user = user_by_email(&db, "undelivered@example.com").await;
    assert!(user.reset_token.is_some());
    assert!(user.reset_token_expiration.is_some());
}
