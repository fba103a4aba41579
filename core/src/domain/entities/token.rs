//! Token entities for the signed-credential lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

/// Discriminates access tokens from refresh tokens inside the claim set.
///
/// The two shapes are never interchangeable: the request authenticator only
/// accepts `Access`, the rotation path only accepts `Refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure bound into a signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID, random per token; used for traceability only
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Whether this is an access or a refresh token
    pub kind: TokenKind,

    /// Login name of the subject
    pub username: String,

    /// Email address; access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Authorization role; access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Organization tags; access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_tags: Option<String>,
}

impl Claims {
    /// Parses the subject claim as a user ID
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Checks whether the expiry timestamp has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Persisted record of an issued refresh token
///
/// Only the SHA-256 hash of the wire string is stored. A record moves
/// through exactly one transition, active to revoked, and is never updated
/// otherwise; rows are retained for audit until external cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// SHA-256 hex digest of the token's wire string; unique across all rows
    pub token_hash: String,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Timestamp of revocation, if any
    pub revoked_at: Option<DateTime<Utc>>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Creates a new active record for a freshly issued refresh token
    pub fn new(user_id: Uuid, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at,
            revoked: false,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Checks whether the record's expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A record is usable for rotation iff it is neither revoked nor expired
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Marks the record revoked; revoking twice keeps the first timestamp
    pub fn revoke(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.revoked_at = Some(Utc::now());
        }
    }
}

/// Access/refresh token pair handed to the caller after issuance or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Signed refresh token
    pub refresh_token: String,

    /// Access token expiry instant
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry instant
    pub refresh_expires_at: DateTime<Utc>,

    /// Access token lifetime in seconds, as configured
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_user_id_parsing() {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: "convo".to_string(),
            aud: "convo-api".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
            kind: TokenKind::Access,
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            role: Some(Role::User),
            org_tags: Some(String::new()),
        };

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_claims_omit_access_fields() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "convo".to_string(),
            aud: "convo-api".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 604_800,
            kind: TokenKind::Refresh,
            username: "alice".to_string(),
            email: None,
            role: None,
            org_tags: None,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"kind\":\"refresh\""));
        assert!(!json.contains("email"));
        assert!(!json.contains("role"));
        assert!(!json.contains("org_tags"));

        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_record_state_machine() {
        let mut record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "a".repeat(64),
            Utc::now() + Duration::days(7),
        );

        assert!(record.is_active());
        assert!(record.revoked_at.is_none());

        record.revoke();
        assert!(record.revoked);
        assert!(!record.is_active());
        let first_revoked_at = record.revoked_at;
        assert!(first_revoked_at.is_some());

        // Idempotent: a second revocation keeps the original timestamp
        record.revoke();
        assert_eq!(record.revoked_at, first_revoked_at);
    }

    #[test]
    fn test_expired_record_is_not_active() {
        let record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "b".repeat(64),
            Utc::now() - Duration::seconds(1),
        );

        assert!(record.is_expired());
        assert!(!record.revoked);
        assert!(!record.is_active());
    }
}
