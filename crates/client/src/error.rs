//! Error type for the backend client.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::TokenStoreError;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the best text the error body offered, so `Display`
    /// shows it unchanged for callers to put in front of a user.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Validation detail, `message`, `error`, or a generic fallback.
        message: String,
    },

    /// A success body could not be decoded into the expected type.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A payment payload failed client-side validation and was not sent.
    #[error("invalid payment data: {}", .0.join("; "))]
    InvalidPayment(Vec<String>),

    /// A request parameter was rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The session token could not be read or written.
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    /// Client configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// HTTP status of a backend error response, if that is what this is.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token (missing or expired).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_only() {
        let err = ApiError::Api {
            status: 422,
            message: "Email invalid".to_string(),
        };
        assert_eq!(err.to_string(), "Email invalid");
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_invalid_payment_lists_every_problem() {
        let err = ApiError::InvalidPayment(vec![
            "description is required".to_string(),
            "card token is required".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid payment data: description is required; card token is required"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unauthorized_and_not_found() {
        let unauthorized = ApiError::Api {
            status: 401,
            message: "Token expired".to_string(),
        };
        assert!(unauthorized.is_unauthorized());

        let missing = ApiError::Api {
            status: 404,
            message: "Product not found".to_string(),
        };
        assert!(missing.is_not_found());
    }
}
