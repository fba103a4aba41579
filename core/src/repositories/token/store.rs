//! Refresh token store trait defining the interface for token persistence.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainResult;

/// Store of issued refresh tokens, keyed by the hash of their wire string
///
/// Implementations own the uniqueness constraint on `token_hash` and the
/// atomicity of `rotate`. Rows are never deleted on the request path; the
/// only mutation is revocation.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError::Token(TokenError::DuplicateHash))` - A row with
    ///   the same `token_hash` already exists
    async fn save(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord>;

    /// Find the non-revoked record with the given token hash
    ///
    /// Expiry is deliberately not part of the lookup predicate: an expired
    /// but present row is returned so the caller can distinguish it (and
    /// lazily revoke it) instead of treating it like a forged token.
    async fn find_active_by_hash(
        &self,
        token_hash: &str,
    ) -> DomainResult<Option<RefreshTokenRecord>>;

    /// Revoke a record by id
    ///
    /// Idempotent: revoking an already-revoked or missing row is a no-op,
    /// so concurrent revocation attempts converge safely.
    async fn revoke(&self, id: Uuid) -> DomainResult<()>;

    /// Revoke every non-revoked record owned by the user
    ///
    /// # Returns
    /// Number of records revoked. An `issue` committing after this call's
    /// snapshot may survive it; that race is accepted (last writer wins).
    async fn revoke_all_for_user(&self, user_id: Uuid) -> DomainResult<usize>;

    /// Atomically revoke `old_id` and insert `replacement`
    ///
    /// The two writes happen in one atomic unit: a failure after the revoke
    /// rolls the revoke back too. Exactly one of two concurrent rotations
    /// of the same row succeeds.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The inserted replacement
    /// * `Err(DomainError::Token(TokenError::InvalidRefreshToken))` - The
    ///   old row was already revoked (or does not exist)
    /// * `Err(DomainError::Token(TokenError::DuplicateHash))` - The
    ///   replacement's hash collides with an existing row
    async fn rotate(
        &self,
        old_id: Uuid,
        replacement: RefreshTokenRecord,
    ) -> DomainResult<RefreshTokenRecord>;

    /// Delete rows whose retention window has lapsed
    ///
    /// Maintenance only, called by the cleanup service: removes expired
    /// rows and revoked rows older than `retain_revoked`.
    ///
    /// # Returns
    /// Number of rows deleted
    async fn delete_expired(&self, retain_revoked: Duration) -> DomainResult<usize>;
}
