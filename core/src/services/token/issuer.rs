//! Claim-set construction for access and refresh tokens.

use chrono::{Duration, Utc};
use uuid::Uuid;

use convo_shared::config::JwtConfig;

use crate::domain::entities::token::{Claims, TokenKind};
use crate::domain::entities::user::User;

/// Builds the claim sets for freshly issued tokens
///
/// Pure construction: no side effects, no store access. Persisting the
/// refresh token's hash is the lifecycle's job.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the JWT configuration
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs),
        }
    }

    /// Claims for a short-lived access token carrying the full identity
    ///
    /// The `jti` is freshly random per call; access tokens are never looked
    /// up by id, so collisions are ignored.
    pub fn access_claims(&self, user: &User) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user.id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            kind: TokenKind::Access,
            username: user.username.clone(),
            email: Some(user.email.clone()),
            role: Some(user.role),
            org_tags: Some(user.org_tags.clone()),
        }
    }

    /// Claims for a longer-lived refresh token
    ///
    /// Refresh tokens authorize rotation only, so no role, email, or org
    /// tags are embedded.
    pub fn refresh_claims(&self, user: &User) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user.id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            kind: TokenKind::Refresh,
            username: user.username.clone(),
            email: None,
            role: None,
            org_tags: None,
        }
    }

    /// Configured access token lifetime in seconds
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}
