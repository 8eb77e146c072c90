//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `AUTOPECAS_API_URL` - Absolute backend URL including the `/api` prefix
//!   (default: `http://localhost:3000/api`)
//! - `AUTOPECAS_TOKEN_FILE` - File holding the bearer token between runs
//!   (default: `$HOME/.autopecas/token`; in-memory when `HOME` is unset)
//! - `AUTOPECAS_API_TIMEOUT_SECS` - Per-request timeout, `0` disables it
//!   (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::{FileTokenStore, MemoryTokenStore, Session};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://loja.example.com/api`.
    pub api_url: Url,
    /// Where the bearer token is persisted, if anywhere.
    pub token_file: Option<PathBuf>,
    /// Per-request timeout (`None` waits indefinitely).
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Local development backend, 30 second timeout, in-memory token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the built-in URL fails to parse.
    pub fn local() -> Result<Self, ConfigError> {
        Self::for_url(DEFAULT_API_URL)
    }

    /// Configuration pointing at `api_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not absolute.
    pub fn for_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("api_url", api_url)?,
            token_file: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(
            "AUTOPECAS_API_URL",
            &get_env_or_default("AUTOPECAS_API_URL", DEFAULT_API_URL),
        )?;

        let token_file = get_optional_env("AUTOPECAS_TOKEN_FILE")
            .map(PathBuf::from)
            .or_else(|| {
                get_optional_env("HOME").map(|home| PathBuf::from(home).join(".autopecas/token"))
            });

        let timeout_secs = get_env_or_default(
            "AUTOPECAS_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("AUTOPECAS_API_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            token_file,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }

    /// Build the session this configuration describes.
    ///
    /// Uses a [`FileTokenStore`] when `token_file` is set, otherwise an
    /// in-memory store.
    #[must_use]
    pub fn session(&self) -> Session {
        match &self.token_file {
            Some(path) => Session::new(FileTokenStore::new(path)),
            None => Session::new(MemoryTokenStore::default()),
        }
    }

    /// Base URL without a trailing slash, ready for `"{base}/endpoint"`.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{value} is not a base URL"),
        ));
    }
    Ok(url)
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
