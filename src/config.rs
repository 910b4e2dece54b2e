use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// Constructed once at startup and passed explicitly to everything that
/// needs it; the signing secret and admin code are never read from the
/// environment after boot.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://exambook.db, postgres://...)
    pub database_url: String,

    /// JWT signing secret for access, refresh and reset tokens
    pub jwt_secret: String,

    /// Privileged registration code; a matching `admin_code` at signup
    /// creates the user with the admin flag set
    pub admin_code: String,

    /// Access token expiry in minutes (default: 15)
    pub access_token_expiry_mins: u64,

    /// Refresh token expiry in days (default: 30)
    pub refresh_token_expiry_days: u64,

    /// Password reset token expiry in seconds (default: 3600)
    pub reset_token_expiry_secs: u64,

    /// Minimum accepted password length (default: 8)
    pub min_password_length: usize,

    /// Sender address stamped on outgoing notifications
    pub mail_sender: String,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://exambook.db?mode=rwc".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "exambook-dev-secret-change-me".to_string()),
            admin_code: std::env::var("ADMIN_CODE")
                .unwrap_or_else(|_| "exambook-dev-admin-code".to_string()),
            access_token_expiry_mins: std::env::var("ACCESS_TOKEN_EXPIRY_MINS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            refresh_token_expiry_days: std::env::var("REFRESH_TOKEN_EXPIRY_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            reset_token_expiry_secs: std::env::var("RESET_TOKEN_EXPIRY_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            min_password_length: std::env::var("MIN_PASSWORD_LENGTH")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),
            mail_sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "no-reply@exambook.dev".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
