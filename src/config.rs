//! Configuration module.

use serde::Deserialize;
use std::path::Path;

use crate::auth::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::{FoodsavingError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty = any origin, no credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Secret used to sign access tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
    /// Requests per minute per IP on login and password reset.
    #[serde(default = "default_auth_rate_limit")]
    pub auth_rate_limit: u32,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only enable behind a reverse proxy that sets these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_jwt_access_expiry() -> u64 {
    3600
}

fn default_auth_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
            auth_rate_limit: default_auth_rate_limit(),
            trust_proxy_headers: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/foodsaving.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/foodsaving.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Account mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Sender address used for account mails.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// How long an activation key stays valid, in hours.
    #[serde(default = "default_key_expiry_hours")]
    pub verification_key_expiry_hours: i64,
    /// Length of generated replacement passwords.
    #[serde(default = "default_reset_password_length")]
    pub reset_password_length: usize,
}

fn default_from_address() -> String {
    "noreply@foodsaving.world".to_string()
}

fn default_key_expiry_hours() -> i64 {
    168 // 7 days
}

fn default_reset_password_length() -> usize {
    16
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            verification_key_expiry_hours: default_key_expiry_hours(),
            reset_password_length: default_reset_password_length(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FoodsavingError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FoodsavingError::Config(format!("parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// - `FOODSAVING_JWT_SECRET`: overrides `server.jwt_secret`
    /// - `FOODSAVING_DATABASE_PATH`: overrides `database.path`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("FOODSAVING_JWT_SECRET") {
            if !secret.is_empty() {
                self.server.jwt_secret = secret;
            }
        }
        if let Ok(path) = std::env::var("FOODSAVING_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate settings that have no usable default.
    pub fn validate(&self) -> Result<()> {
        if self.server.jwt_secret.is_empty() {
            return Err(FoodsavingError::Config(
                "jwt_secret is not set. Set it in config.toml or via FOODSAVING_JWT_SECRET."
                    .to_string(),
            ));
        }
        if self.mail.verification_key_expiry_hours <= 0 {
            return Err(FoodsavingError::Config(
                "mail.verification_key_expiry_hours must be positive".to_string(),
            ));
        }
        let length = self.mail.reset_password_length;
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(FoodsavingError::Config(format!(
                "mail.reset_password_length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}"
            )));
        }
        Ok(())
    }
}
