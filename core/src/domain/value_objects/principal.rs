//! Authenticated caller identity.

use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenKind};
use crate::domain::entities::user::Role;
use crate::errors::{DomainError, TokenError};

/// Resolved identity of an authenticated caller
///
/// A plain immutable value built from verified access-token claims. It is
/// deliberately decoupled from the persistence-level `User`: downstream
/// handlers receive this and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Opaque stable identifier of the user
    pub user_id: Uuid,

    /// Login name
    pub username: String,

    /// Email address
    pub email: String,

    /// Authorization role
    pub role: Role,

    /// Free-form organization classification; may be empty
    pub org_tags: String,
}

impl Principal {
    /// Builds a principal from verified access-token claims
    ///
    /// Fails when the claim set does not have the access shape (wrong kind,
    /// unparsable subject, or missing role/email), which also rejects
    /// refresh tokens presented on the request path.
    pub fn from_access_claims(claims: &Claims) -> Result<Self, DomainError> {
        if claims.kind != TokenKind::Access {
            return Err(DomainError::Token(TokenError::Malformed));
        }
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Malformed))?;
        let email = claims
            .email
            .clone()
            .ok_or(DomainError::Token(TokenError::Malformed))?;
        let role = claims.role.ok_or(DomainError::Token(TokenError::Malformed))?;

        Ok(Self {
            user_id,
            username: claims.username.clone(),
            email,
            role,
            org_tags: claims.org_tags.clone().unwrap_or_default(),
        })
    }

    /// Checks whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
