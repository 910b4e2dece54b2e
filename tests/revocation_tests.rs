use exambook_auth::auth::jwt::TokenKind;
use exambook_auth::auth::revocation::{is_revoked, revoke};
use exambook_auth::testing::test_db;
use exambook_auth::TestApp;

#[tokio::test]
async fn test_revoke_then_lookup() {
    let db = test_db().await;

    assert!(!is_revoked(&db, "jti-1").await.unwrap());
    revoke(&db, "jti-1", TokenKind::Access, 1).await.unwrap();
    assert!(is_revoked(&db, "jti-1").await.unwrap());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let db = test_db().await;

    revoke(&db, "jti-2", TokenKind::Refresh, 1).await.unwrap();
    revoke(&db, "jti-2", TokenKind::Refresh, 1).await.unwrap();
    assert!(is_revoked(&db, "jti-2").await.unwrap());
}

#[tokio::test]
async fn test_unknown_identifier_is_not_revoked() {
    let db = test_db().await;
    assert!(!is_revoked(&db, "never-seen").await.unwrap());
}

#[tokio::test]
async fn test_refresh_mints_new_access_token() {
    let app = TestApp::new().await;

    app.create_user("r@example.com", "refresher", "password123")
        .await;
    let (access, refresh) = app.login("r@example.com", "password123").await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({"refresh_token": refresh}).to_string(),
        )
        .await;

    assert_eq!(res.status, 200);
    let new_access = res.data()["access_token"].as_str().unwrap().to_string();
    assert_ne!(new_access, access);

    // The minted token authenticates.
    let me = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), &new_access)
        .await;
    assert_eq!(me.status, 200);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::new().await;

    app.create_user("w@example.com", "wrongkind", "password123")
        .await;
    let (access, _refresh) = app.login("w@example.com", "password123").await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({"refresh_token": access}).to_string(),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.error()["code"], "WRONG_TOKEN_TYPE");
}

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let app = TestApp::new().await;

    app.create_user("l@example.com", "leaver", "password123")
        .await;
    let (access, _refresh) = app.login("l@example.com", "password123").await;

    let me = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), &access)
        .await;
    assert_eq!(me.status, 200);

    let res = app
        .client
        .post_with_auth(&app.url("/api/auth/logout"), &access, "")
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["status"], "logged out");
    assert!(res.data()["refresh_token_revoked"].is_null());

    // The exact same access token is now rejected before its expiry.
    let me = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), &access)
        .await;
    assert_eq!(me.status, 401);
    assert_eq!(me.error()["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_logout_revokes_supplied_refresh_token() {
    let app = TestApp::new().await;

    app.create_user("both@example.com", "bothout", "password123")
        .await;
    let (access, refresh) = app.login("both@example.com", "password123").await;

    let res = app
        .client
        .post_with_auth(
            &app.url("/api/auth/logout"),
            &access,
            &serde_json::json!({"refresh_token": refresh}).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["refresh_token_revoked"], true);

    // The revoked refresh token can no longer mint access tokens, even
    // though it has not expired.
    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({"refresh_token": refresh}).to_string(),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error()["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_logout_with_bad_refresh_token_is_partial_success() {
    let app = TestApp::new().await;

    app.create_user("p@example.com", "partial", "password123")
        .await;
    let (access, _refresh) = app.login("p@example.com", "password123").await;

    let res = app
        .client
        .post_with_auth(
            &app.url("/api/auth/logout"),
            &access,
            &serde_json::json!({"refresh_token": "garbage"}).to_string(),
        )
        .await;

    // The operation succeeds; the outcome records the failed refresh
    // revocation and the access revocation stands.
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["refresh_token_revoked"], false);

    let me = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), &access)
        .await;
    assert_eq!(me.status, 401);
    assert_eq!(me.error()["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::new().await;

    let res = app.client.post(&app.url("/api/auth/logout"), "").await;
    assert_eq!(res.status, 401);
}
