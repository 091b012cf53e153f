//! Error types for the super-admin console

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the super-admin console
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body as text, possibly empty
        body: String,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not match what the endpoint is documented to return
    #[error("Unexpected response shape from {endpoint}: {detail}")]
    UnexpectedShape {
        /// Endpoint path that produced the body
        endpoint: String,
        /// What was wrong with it
        detail: String,
    },

    /// The server rejected our credentials (401/403)
    #[error("Not authorized (HTTP {status})")]
    Unauthorized {
        /// 401 or 403
        status: u16,
    },

    /// An identifier failed the client-side guard
    #[error("Invalid {resource} id")]
    InvalidId {
        /// Which kind of record the id addresses
        resource: String,
    },

    /// "Added by me" was requested but no admin identity is available
    #[error("Admin identity not found in token. Please log in again.")]
    IdentityUnavailable,

    /// A mutation for the same record has not finished yet
    #[error("An action for record {id} is already in progress")]
    MutationInFlight {
        /// Record the duplicate action addressed
        id: i64,
    },

    /// The owning view went away before the request finished
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Session storage error
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Validation error
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an unexpected-shape error
    pub fn unexpected_shape(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid id error
    pub fn invalid_id(resource: impl Into<String>) -> Self {
        Self::InvalidId {
            resource: resource.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether a manual retry has a chance of succeeding
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::Network(_) => true,
            _ => false,
        }
    }

    /// Whether this error should end the session
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Human-readable message for a view, prefixed with what was being done
    ///
    /// Network failures collapse to a generic message; everything else keeps
    /// the status and server text so the operator can see what happened.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Self::Network(_) => "Network error. Please try again.".to_string(),
            Self::Http { status, body } if body.trim().is_empty() => {
                format!("Failed to {action}: {status}")
            }
            Self::Http { status, body } => format!("Failed to {action}: {status} {}", body.trim()),
            Self::Unauthorized { .. } => "Your session has expired. Please log in again.".to_string(),
            other => format!("Failed to {action}: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_http_error_display() {
        let error = Error::http(500, "boom");
        assert_eq!(error.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_retryable() {
        assert!(Error::http(503, "").is_retryable());
        assert!(Error::network("connection refused").is_retryable());
        assert!(!Error::http(404, "").is_retryable());
        assert!(!Error::invalid_id("carousel image").is_retryable());
        assert!(!Error::IdentityUnavailable.is_retryable());
    }

    #[test]
    fn test_auth_failure() {
        assert!(Error::Unauthorized { status: 401 }.is_auth_failure());
        assert!(!Error::http(401, "").is_auth_failure());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::network("reset").user_message("fetch approved admins"),
            "Network error. Please try again."
        );
        assert_eq!(
            Error::http(500, "Internal Server Error\n").user_message("approve admin"),
            "Failed to approve admin: 500 Internal Server Error"
        );
        assert_eq!(
            Error::http(404, "").user_message("load hotels"),
            "Failed to load hotels: 404"
        );
        assert_eq!(
            Error::invalid_id("carousel image").user_message("delete image"),
            "Failed to delete image: Invalid carousel image id"
        );
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = Error::from(json_error);
        assert!(matches!(error, Error::Serialization(_)));
        assert!(error.to_string().contains("Serialization error"));
    }
}
