//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT signing and token lifetime configuration
//! - `database` - Database connection and pool configuration

pub mod auth;
pub mod database;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::JwtConfig;
pub use database::DatabaseConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            database: DatabaseConfig::from_env(),
        }
    }
}
