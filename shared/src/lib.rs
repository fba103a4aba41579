//! Shared utilities and common types for the Convo server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Validation utilities

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, DatabaseConfig, JwtConfig};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use utils::validation;
