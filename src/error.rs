//! Error types for the Fintrack connect crate.

use thiserror::Error;

/// Result type alias for connect operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors that can occur when talking to the cloud backend.
///
/// Backend failures are passed through untouched: the `Api` variant carries the
/// status plus the backend's own error code and message, with no local
/// reinterpretation or recovery.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (CSV export file write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error response from the cloud backend, surfaced as-is
    #[error("API error ({status}): [{code}] {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Invalid request (missing required data, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ConnectError {
    /// Create an API error from status, backend code, and message
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Authentication or row-level-security rejection.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::Api { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }

    /// Zero rows matched a single-row fetch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if matches!(status, 404 | 406))
    }

    /// Database constraint violation (Postgres class 23 integrity errors,
    /// e.g. `23514` for a check-constraint failure on `budget_limit`).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code.starts_with("23"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_constraint_code_is_constraint_violation() {
        let err = ConnectError::api(
            400,
            "23514",
            "new row for relation \"budgets\" violates check constraint",
        );
        assert!(err.is_constraint_violation());
        assert_eq!(err.status_code(), Some(400));
        assert!(!err.is_auth_error());
    }

    #[test]
    fn rls_rejection_is_auth_error() {
        let err = ConnectError::api(403, "42501", "permission denied for table income");
        assert!(err.is_auth_error());
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn missing_single_row_is_not_found() {
        let err = ConnectError::api(406, "PGRST116", "JSON object requested, multiple (or no) rows returned");
        assert!(err.is_not_found());
    }
}
