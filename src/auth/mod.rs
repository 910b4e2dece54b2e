pub mod jwt;
pub mod password;
pub mod reset;
pub mod revocation;
pub mod service;

pub use jwt::{
    issue_access_token, issue_refresh_token, issue_reset_token, verify_reset_token, verify_token,
    Claims, TokenKind, VerifiedToken,
};
pub use password::{hash_password, verify_password};
pub use reset::hash_token;
