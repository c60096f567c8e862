//! Error types for Data Plane API operations.
//!
//! Every failure the client can produce is categorised so callers can branch
//! on "not found" and "conflict" without inspecting message text.

use std::fmt;

/// Result type alias for Data Plane API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP status codes at or above this value are treated as API errors.
pub const HTTP_ERROR_THRESHOLD: u16 = 300;

/// Categories of API errors.
///
/// The reconciler only ever branches on [`ErrorCategory::NotFound`];
/// everything else is fatal for the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The addressed resource does not exist (HTTP 404).
    NotFound,
    /// The resource already exists or the version token was stale (HTTP 409).
    Conflict,
    /// Credentials were rejected (HTTP 401/403).
    Auth,
    /// The request never produced an HTTP response.
    Network,
    /// The response could not be decoded.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflicting change",
            Self::Auth => "Authentication failed",
            Self::Network => "Network connectivity issue",
            Self::Format => "Unexpected response format",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Verify the resource name and its parent are correct",
            Self::Conflict => {
                "The resource already exists or the configuration changed underneath you; use 'haproxyctl apply -f ...' or retry"
            }
            Self::Auth => "Run 'haproxyctl login' to update the stored credentials",
            Self::Network => "Check that the Data Plane API is reachable at the configured URL",
            Self::Format => "Check that the configured URL points at a Data Plane API v3 endpoint",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the Data Plane API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with a status code >= 300.
    #[error("HAProxy API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request failed before a response was received.
    #[error("API request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("failed to parse API response: {0}")]
    InvalidResponse(String),

    /// The configuration version endpoint returned something other than an integer.
    #[error("failed to parse version as integer: {0:?}")]
    InvalidVersion(String),
}

impl Error {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code, if the API produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api { status: 404, .. } => ErrorCategory::NotFound,
            Error::Api { status: 409, .. } => ErrorCategory::Conflict,
            Error::Api {
                status: 401 | 403, ..
            } => ErrorCategory::Auth,
            Error::Api { .. } => ErrorCategory::Other,
            Error::Transport(_) => ErrorCategory::Network,
            Error::InvalidResponse(_) | Error::InvalidVersion(_) => ErrorCategory::Format,
        }
    }

    /// Whether the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether the API rejected the write as a conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.category() == ErrorCategory::Conflict
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Api {
                status: code,
                body: String::new(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
