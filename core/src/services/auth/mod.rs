//! Authentication service module
//!
//! This module provides the credential-facing side of the system:
//! - User registration and login
//! - Token refresh and logout orchestration
//! - Per-request bearer-token authentication
//! - The delegated password-verification primitive

mod authenticator;
mod password;
mod service;

#[cfg(test)]
mod tests;

pub use authenticator::{AuthOutcome, RequestAuthenticator};
pub use password::{BcryptPasswordVerifier, PasswordVerifier};
pub use service::{AuthService, RegisterRequest};
