//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Machine-readable error body returned by API endpoints
///
/// Authentication failures always use the same generic code and message so
/// that callers cannot distinguish why a token was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// The uniform body for any authentication failure
    pub fn unauthenticated() -> Self {
        Self::new(error_codes::UNAUTHORIZED, "authentication required")
    }
}

/// Common error codes used across the application
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const CONFLICT: &str = "CONFLICT";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_body_is_generic() {
        let body = ErrorResponse::unauthenticated();
        assert_eq!(body.code, error_codes::UNAUTHORIZED);
        assert_eq!(body.message, "authentication required");
    }
}
