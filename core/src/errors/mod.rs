//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use convo_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Fatal configuration problem; raised at construction time, never
    /// at request time
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The persistent store is unreachable or failed. Propagated as an
    /// infrastructure error, never masked as an authentication failure.
    #[error("Store unavailable: {message}")]
    Store { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// HTTP status the boundary layer should map this error to
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation { .. } => 400,
            DomainError::Auth(AuthError::UsernameTaken)
            | DomainError::Auth(AuthError::EmailTaken) => 409,
            // Signing faults and escaped hash collisions are internal
            // failures, not auth decisions
            DomainError::Token(TokenError::DuplicateHash | TokenError::GenerationFailed) => 500,
            DomainError::Auth(_) | DomainError::Token(_) => 401,
            DomainError::Config { .. } | DomainError::Internal { .. } => 500,
            DomainError::Store { .. } => 503,
        }
    }
}

impl IntoErrorResponse for DomainError {
    /// Outward response body. Every 401 collapses into one fixed generic
    /// body; the specific kind stays in the logs.
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Validation { message } => {
                ErrorResponse::new(error_codes::BAD_REQUEST, message.clone())
            }
            DomainError::Auth(AuthError::UsernameTaken) => {
                ErrorResponse::new(error_codes::CONFLICT, "user_exists")
            }
            DomainError::Auth(AuthError::EmailTaken) => {
                ErrorResponse::new(error_codes::CONFLICT, "email_exists")
            }
            DomainError::Token(TokenError::DuplicateHash | TokenError::GenerationFailed) => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "internal error")
            }
            DomainError::Auth(_) | DomainError::Token(_) => ErrorResponse::unauthenticated(),
            DomainError::Store { .. } => {
                ErrorResponse::new(error_codes::DATABASE_ERROR, "service unavailable")
            }
            DomainError::Config { .. } | DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "internal error")
            }
        }
    }
}
