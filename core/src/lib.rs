//! # Convo Core
//!
//! Core business logic and domain layer for the Convo backend.
//! This crate contains domain entities, the token lifecycle and
//! authentication services, repository interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::token::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
pub use domain::entities::user::{Role, User};
pub use domain::value_objects::{AuthResponse, Principal};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{RefreshTokenStore, UserRepository};
pub use services::{
    AuthOutcome, AuthService, BcryptPasswordVerifier, ClaimsCodec, PasswordVerifier,
    RegisterRequest, RequestAuthenticator, TokenCleanupConfig, TokenCleanupService, TokenIssuer,
    TokenLifecycle,
};
