//! Domain-specific error types for authentication and token operations
//!
//! The variants here exist for logging and tests; everything a caller sees
//! is normalized at the service boundary so that no distinction between
//! failure causes leaks outward.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Authentication required")]
    Unauthenticated,
}

/// Token-related errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token issuer mismatch")]
    IssuerMismatch,

    #[error("Token audience mismatch")]
    AudienceMismatch,

    #[error("Token expired")]
    Expired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Duplicate token hash")]
    DuplicateHash,

    #[error("Token generation failed")]
    GenerationFailed,
}
