//! In-memory implementation of RefreshTokenStore for testing

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, DomainResult, TokenError};

use super::store::RefreshTokenStore;

/// Mock refresh token store backed by a map keyed on record id
///
/// All mutation happens under one write lock, which gives the same
/// atomicity the SQL implementation gets from transactions.
pub struct MockRefreshTokenStore {
    records: Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>,
}

impl MockRefreshTokenStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of a record by id, for test assertions
    pub async fn get(&self, id: Uuid) -> Option<RefreshTokenRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Number of stored records, revoked ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MockRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenStore for MockRefreshTokenStore {
    async fn save(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        let mut records = self.records.write().await;

        if records.values().any(|r| r.token_hash == record.token_hash) {
            return Err(DomainError::Token(TokenError::DuplicateHash));
        }

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_active_by_hash(
        &self,
        token_hash: &str,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.token_hash == token_hash && !r.revoked)
            .cloned())
    }

    async fn revoke(&self, id: Uuid) -> DomainResult<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&id) {
            record.revoke();
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DomainResult<usize> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn rotate(
        &self,
        old_id: Uuid,
        replacement: RefreshTokenRecord,
    ) -> DomainResult<RefreshTokenRecord> {
        let mut records = self.records.write().await;

        if records.values().any(|r| r.token_hash == replacement.token_hash) {
            return Err(DomainError::Token(TokenError::DuplicateHash));
        }

        match records.get_mut(&old_id) {
            Some(old) if !old.revoked => old.revoke(),
            _ => return Err(DomainError::Token(TokenError::InvalidRefreshToken)),
        }

        records.insert(replacement.id, replacement.clone());
        Ok(replacement)
    }

    async fn delete_expired(&self, retain_revoked: Duration) -> DomainResult<usize> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let before = records.len();

        records.retain(|_, r| {
            let expired = now > r.expires_at;
            let revoked_past_retention = r
                .revoked_at
                .map(|at| now - at > retain_revoked)
                .unwrap_or(false);
            !(expired || revoked_past_retention)
        });

        Ok(before - records.len())
    }
}
