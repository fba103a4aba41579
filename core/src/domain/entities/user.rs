//! User entity consumed by the authentication core.
//!
//! User persistence is owned elsewhere; this crate reads the fields it
//! needs for credential checks and claim construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Canonical wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Password hash produced by the delegated hashing primitive;
    /// never the plaintext
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Authorization role
    pub role: Role,

    /// Free-form organization classification, comma separated; may be empty
    pub org_tags: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the default `USER` role
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        org_tags: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::User,
            org_tags: org_tags.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether the user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("alice", "alice@example.com", "$2b$12$hash", "eng,platform");

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.org_tags, "eng,platform");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("bob", "bob@example.com", "$2b$12$hash", "");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$hash"));
    }
}
