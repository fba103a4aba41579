//! Business services containing domain logic and use cases.

pub mod auth;
pub mod token;

// Re-export commonly used types
pub use auth::{
    AuthOutcome, AuthService, BcryptPasswordVerifier, PasswordVerifier, RegisterRequest,
    RequestAuthenticator,
};
pub use token::{ClaimsCodec, TokenCleanupConfig, TokenCleanupService, TokenIssuer, TokenLifecycle};
