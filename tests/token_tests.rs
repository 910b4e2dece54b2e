use exambook_auth::auth::jwt::{
    issue_access_token, issue_refresh_token, issue_reset_token, verify_reset_token, verify_token,
    Claims, ResetClaims, TokenKind,
};
use exambook_auth::AuthError;
use jsonwebtoken::{encode, EncodingKey, Header};

const SECRET: &str = "test-secret-key-for-testing";

#[test]
fn test_access_token_round_trip() {
    let token = issue_access_token(42, SECRET, 15).unwrap();
    let verified = verify_token(&token, TokenKind::Access, SECRET).unwrap();

    assert_eq!(verified.user_id, 42);
    assert!(!verified.token_id.is_empty());
}

#[test]
fn test_refresh_token_round_trip() {
    let token = issue_refresh_token(7, SECRET, 30).unwrap();
    let verified = verify_token(&token, TokenKind::Refresh, SECRET).unwrap();

    assert_eq!(verified.user_id, 7);
}

#[test]
fn test_wrong_token_type_is_rejected() {
    let access = issue_access_token(1, SECRET, 15).unwrap();
    let refresh = issue_refresh_token(1, SECRET, 30).unwrap();

    assert!(matches!(
        verify_token(&access, TokenKind::Refresh, SECRET),
        Err(AuthError::WrongTokenType)
    ));
    assert!(matches!(
        verify_token(&refresh, TokenKind::Access, SECRET),
        Err(AuthError::WrongTokenType)
    ));
}

#[test]
fn test_garbage_token_is_invalid() {
    assert!(matches!(
        verify_token("not-a-token", TokenKind::Access, SECRET),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn test_wrong_secret_is_invalid() {
    let token = issue_access_token(1, SECRET, 15).unwrap();

    assert!(matches!(
        verify_token(&token, TokenKind::Access, "another-secret"),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn test_expired_token_is_rejected() {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "5".to_string(),
        jti: "some-identifier".to_string(),
        iat: now - 7200,
        exp: now - 3600,
        kind: TokenKind::Access,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        verify_token(&token, TokenKind::Access, SECRET),
        Err(AuthError::ExpiredToken)
    ));
}

#[test]
fn test_token_identifiers_are_unique() {
    let a = issue_access_token(1, SECRET, 15).unwrap();
    let b = issue_access_token(1, SECRET, 15).unwrap();
    assert_ne!(a, b);

    let id_a = verify_token(&a, TokenKind::Access, SECRET).unwrap().token_id;
    let id_b = verify_token(&b, TokenKind::Access, SECRET).unwrap().token_id;
    assert_ne!(id_a, id_b);
}

#[test]
fn test_reset_token_round_trip() {
    let token = issue_reset_token(9, SECRET, 3600).unwrap();
    assert_eq!(verify_reset_token(&token, SECRET), Some(9));
}

#[test]
fn test_reset_token_failures_are_uniformly_none() {
    // Garbage
    assert_eq!(verify_reset_token("garbage", SECRET), None);

    // Wrong secret
    let token = issue_reset_token(9, SECRET, 3600).unwrap();
    assert_eq!(verify_reset_token(&token, "another-secret"), None);

    // Expired
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = ResetClaims {
        sub: "9".to_string(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    assert_eq!(verify_reset_token(&expired, SECRET), None);
}
