//! User repository trait.
//!
//! User persistence is owned by the surrounding application; the auth core
//! only needs lookup by id/username/email and insertion at registration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainResult;

/// Repository trait for user lookups and registration
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Find a user by login name
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Persist a new user
    async fn insert(&self, user: User) -> DomainResult<User>;
}
