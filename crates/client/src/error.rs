//! Client error types with caller-visibility classification.
//!
//! Provides a two-tier error model:
//! - **Expected errors**: HTTP 4xx responses and structured auth failures,
//!   surfaced to the caller unmodified for handling
//! - **Unexpected errors**: transport failures and 5xx responses, reported to
//!   the user only as a generic notification

use snafu::{Location, Snafu};

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types with context-rich error messages.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    /// Network-level failure (connect, TLS, body read).
    #[snafu(display("Transport error at {location}: {source}"))]
    Transport {
        /// Underlying HTTP client error.
        source: reqwest::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// HTTP 4xx response, passed through for caller handling.
    #[snafu(display("API error (status {status}): {message}"))]
    Api {
        /// HTTP status code (400-499).
        status: u16,
        /// Error body or status text from the server.
        message: String,
    },

    /// Structured auth failure from a token-issuing endpoint.
    #[snafu(display("Authentication error (code {code}): {message}"))]
    Auth {
        /// Backend error code; 400 marks credential problems.
        code: u16,
        /// Machine-readable message key (e.g. `EMAIL_NOT_FOUND`).
        message: String,
    },

    /// HTTP 5xx response; details are not exposed to callers.
    #[snafu(display("Server error (status {status})"))]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Configuration validation error.
    #[snafu(display("Configuration error: {message}"))]
    Config {
        /// Error description.
        message: String,
    },

    /// Session storage read/write failure.
    #[snafu(display("Session storage error: {message}"))]
    Storage {
        /// Error description.
        message: String,
    },

    /// URL parsing error.
    #[snafu(display("Invalid URL '{url}': {message}"))]
    InvalidUrl {
        /// The invalid URL.
        url: String,
        /// Parse error description.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[snafu(display("Unexpected response shape: {message}"))]
    Decode {
        /// Error description.
        message: String,
    },
}

impl ClientError {
    /// Returns true if this is an expected client-side error (HTTP 400-499
    /// or a structured auth failure) that callers handle themselves.
    ///
    /// Everything else is unexpected: it has already been reported through
    /// the [`Notifier`](crate::notify::Notifier) as a generic message.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Api { status, .. } => (400..500).contains(status),
            Self::Auth { .. } => true,
            _ => false,
        }
    }

    /// Returns the HTTP status code if this error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Server { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport { source, location: Location::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_4xx_is_client_error() {
        let err = ClientError::Api { status: 404, message: "not found".to_owned() };
        assert!(err.is_client_error());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_auth_is_client_error() {
        let err = ClientError::Auth { code: 400, message: "EMAIL_NOT_FOUND".to_owned() };
        assert!(err.is_client_error());
    }

    #[test]
    fn test_server_5xx_is_not_client_error() {
        let err = ClientError::Server { status: 503 };
        assert!(!err.is_client_error());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_config_is_not_client_error() {
        let err = ClientError::Config { message: "bad".to_owned() };
        assert!(!err.is_client_error());
        assert_eq!(err.status(), None);
    }
}
