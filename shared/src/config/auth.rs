//! Authentication and token configuration

use serde::{Deserialize, Serialize};

/// Minimum signing secret length in bytes (256 bits for HMAC-SHA256)
pub const MIN_SECRET_BYTES: usize = 32;

/// JWT signing and token lifetime configuration
///
/// All values are read-only after startup; services clone what they need
/// during construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens (must be at least 256 bits)
    pub secret: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token expiry time in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_ttl_secs: i64,

    /// Clock skew tolerated when checking token expiry, in seconds.
    /// Applied to the expiry boundary only, never to issued-at.
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: u64,

    /// Extra grace period allowed when an expired refresh token is presented
    /// for rotation, in seconds (on top of the clock skew).
    #[serde(default)]
    pub refresh_grace_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("development-secret-change-me-32bytes!"),
            issuer: String::from("convo"),
            audience: String::from("convo-api"),
            access_token_ttl_secs: 900,      // 15 minutes
            refresh_token_ttl_secs: 604_800, // 7 days
            clock_skew_secs: default_clock_skew(),
            refresh_grace_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with a secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl_secs = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_secs = days * 86_400;
        self
    }

    /// Set the tolerated clock skew in seconds
    pub fn with_clock_skew_secs(mut self, secs: u64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl_secs: env_i64("JWT_ACCESS_TOKEN_TTL", defaults.access_token_ttl_secs),
            refresh_token_ttl_secs: env_i64(
                "JWT_REFRESH_TOKEN_TTL",
                defaults.refresh_token_ttl_secs,
            ),
            clock_skew_secs: env_u64("JWT_CLOCK_SKEW", defaults.clock_skew_secs),
            refresh_grace_secs: env_u64("JWT_REFRESH_GRACE", defaults.refresh_grace_secs),
        }
    }

    /// Check the configuration for fatal startup errors
    ///
    /// A short secret or empty issuer/audience is a deployment mistake and
    /// must abort startup rather than surface at request time.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.len() < MIN_SECRET_BYTES {
            return Err(format!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                self.secret.len()
            ));
        }
        if self.issuer.is_empty() {
            return Err("JWT issuer must not be empty".to_string());
        }
        if self.audience.is_empty() {
            return Err("JWT audience must not be empty".to_string());
        }
        if self.access_token_ttl_secs <= 0 || self.refresh_token_ttl_secs <= 0 {
            return Err("token TTLs must be positive".to_string());
        }
        Ok(())
    }
}

fn default_clock_skew() -> u64 {
    30
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default_is_valid() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_ttl_secs, 900);
        assert_eq!(config.refresh_token_ttl_secs, 604_800);
        assert_eq!(config.clock_skew_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("0123456789abcdef0123456789abcdef")
            .with_access_ttl_minutes(30)
            .with_refresh_ttl_days(14)
            .with_clock_skew_secs(60);

        assert_eq!(config.access_token_ttl_secs, 1800);
        assert_eq!(config.refresh_token_ttl_secs, 1_209_600);
        assert_eq!(config.clock_skew_secs, 60);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = JwtConfig::new("too-short");
        let err = config.validate().unwrap_err();
        assert!(err.contains("32 bytes"));
    }

    #[test]
    fn test_empty_issuer_rejected() {
        let mut config = JwtConfig::default();
        config.issuer = String::new();
        assert!(config.validate().is_err());
    }
}
