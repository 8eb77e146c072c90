//! Database connection settings loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DB_HOST` - `PostgreSQL` host (default: localhost)
//! - `DB_PORT` - `PostgreSQL` port (default: 5432)
//! - `DB_NAME` - Database name (default: autopecas)
//! - `DB_USER` - Role to connect as (default: postgres)
//! - `DB_PASSWORD` - Role password (default: empty)
//! - `DB_SSL` - `true` or `1` to require TLS; anything else prefers it

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection settings for the maintenance commands.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: SecretString,
    /// Require TLS instead of merely preferring it.
    pub require_ssl: bool,
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DB_PORT` is not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let port = get_env_or_default("DB_PORT", "5432")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DB_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host: get_env_or_default("DB_HOST", "localhost"),
            port,
            database: get_env_or_default("DB_NAME", "autopecas"),
            user: get_env_or_default("DB_USER", "postgres"),
            password: SecretString::from(get_env_or_default("DB_PASSWORD", "")),
            require_ssl: get_optional_env("DB_SSL").is_some_and(|v| parse_flag(&v)),
        })
    }

    /// TLS mode for the connection.
    #[must_use]
    pub const fn ssl_mode(&self) -> PgSslMode {
        if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        }
    }

    /// Connection options for sqlx.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .ssl_mode(self.ssl_mode())
            .application_name("ap-cli");

        let password = self.password.expose_secret();
        if password.is_empty() {
            options
        } else {
            options.password(password)
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1") || value.trim().eq_ignore_ascii_case("true")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
