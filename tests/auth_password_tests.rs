use exambook_auth::auth::{hash_password, verify_password};

#[test]
fn test_hash_and_verify() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password("correct horse battery staple", &hash).unwrap());
}

#[test]
fn test_wrong_password_fails() {
    let hash = hash_password("password123").unwrap();
    assert!(!verify_password("password124", &hash).unwrap());
    assert!(!verify_password("", &hash).unwrap());
}

#[test]
fn test_hash_is_not_plaintext() {
    let hash = hash_password("password123").unwrap();
    assert_ne!(hash, "password123");
    assert!(hash.starts_with("$argon2"));
}

#[test]
fn test_salts_are_random() {
    let a = hash_password("password123").unwrap();
    let b = hash_password("password123").unwrap();
    assert_ne!(a, b);
    assert!(verify_password("password123", &a).unwrap());
    assert!(verify_password("password123", &b).unwrap());
}

#[test]
fn test_garbage_hash_is_an_error() {
    assert!(verify_password("password123", "not-a-phc-string").is_err());
}
