//! Token lifecycle module
//!
//! This module handles all token-related operations:
//! - Signing and verification of the claim set (codec)
//! - Access/refresh claim construction (issuer)
//! - Issuance, rotation, and revocation against the store (lifecycle)
//! - Background cleanup of rows past their retention window

mod cleanup;
mod codec;
mod issuer;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{TokenCleanupConfig, TokenCleanupService};
pub use codec::ClaimsCodec;
pub use issuer::TokenIssuer;
pub use service::{hash_token, TokenLifecycle};
