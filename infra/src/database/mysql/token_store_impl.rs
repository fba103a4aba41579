//! MySQL implementation of the RefreshTokenStore trait.
//!
//! Backing table:
//!
//! ```sql
//! CREATE TABLE refresh_tokens (
//!     id          CHAR(36)     NOT NULL PRIMARY KEY,
//!     user_id     CHAR(36)     NOT NULL,
//!     token_hash  CHAR(64)     NOT NULL,
//!     expires_at  DATETIME(6)  NOT NULL,
//!     revoked     BOOLEAN      NOT NULL DEFAULT FALSE,
//!     revoked_at  DATETIME(6)  NULL,
//!     created_at  DATETIME(6)  NOT NULL,
//!     UNIQUE KEY idx_refresh_token_hash (token_hash),
//!     KEY idx_refresh_token_user (user_id)
//! );
//! ```
//!
//! The unique key on `token_hash` is what turns a hash collision into a
//! `DuplicateHash` error, and the conditional revoke inside `rotate`'s
//! transaction is what arbitrates concurrent rotations of the same row.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{MySql, MySqlPool, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use convo_core::domain::entities::token::RefreshTokenRecord;
use convo_core::errors::{DomainError, DomainResult, TokenError};
use convo_core::repositories::RefreshTokenStore;

/// MySQL-backed refresh token store
pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    /// Create a new store over a connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> DomainResult<RefreshTokenRecord> {
        let id: String = row.try_get("id").map_err(store_err)?;
        let user_id: String = row.try_get("user_id").map_err(store_err)?;

        Ok(RefreshTokenRecord {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("invalid token row UUID: {}", e),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("invalid user UUID in token row: {}", e),
            })?,
            token_hash: row.try_get("token_hash").map_err(store_err)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(store_err)?,
            revoked: row.try_get("revoked").map_err(store_err)?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(store_err)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(store_err)?,
        })
    }
}

async fn insert_record(
    tx: &mut Transaction<'_, MySql>,
    record: &RefreshTokenRecord,
) -> DomainResult<()> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (
            id, user_id, token_hash, expires_at, revoked, revoked_at, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.user_id.to_string())
    .bind(&record.token_hash)
    .bind(record.expires_at)
    .bind(record.revoked)
    .bind(record.revoked_at)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await
    .map_err(insert_err)?;

    Ok(())
}

#[async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn save(&self, record: RefreshTokenRecord) -> DomainResult<RefreshTokenRecord> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        insert_record(&mut tx, &record).await?;
        tx.commit().await.map_err(store_err)?;
        Ok(record)
    }

    async fn find_active_by_hash(
        &self,
        token_hash: &str,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked, revoked_at, created_at
            FROM refresh_tokens
            WHERE token_hash = ? AND revoked = FALSE
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke(&self, id: Uuid) -> DomainResult<()> {
        // Affecting zero rows is fine: already revoked or never existed
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = ?
            WHERE id = ? AND revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DomainResult<usize> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = ?
            WHERE user_id = ? AND revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() as usize)
    }

    async fn rotate(
        &self,
        old_id: Uuid,
        replacement: RefreshTokenRecord,
    ) -> DomainResult<RefreshTokenRecord> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = ?
            WHERE id = ? AND revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(old_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        if revoked.rows_affected() == 0 {
            // Lost a rotation race or the row never existed; the open
            // transaction is dropped and rolls back
            debug!(%old_id, "rotation found no active row to revoke");
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        insert_record(&mut tx, &replacement).await?;

        tx.commit().await.map_err(store_err)?;
        Ok(replacement)
    }

    async fn delete_expired(&self, retain_revoked: Duration) -> DomainResult<usize> {
        let now = Utc::now();
        let revoked_cutoff = now - retain_revoked;

        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < ? OR (revoked = TRUE AND revoked_at < ?)
            "#,
        )
        .bind(now)
        .bind(revoked_cutoff)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(result.rows_affected() as usize)
    }
}

/// Maps a driver error on reads/updates to a store-unavailable error
fn store_err(err: sqlx::Error) -> DomainError {
    DomainError::Store {
        message: err.to_string(),
    }
}

/// Maps a driver error on inserts, distinguishing the unique-key violation
/// on `token_hash` from genuine store failures
fn insert_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::Token(TokenError::DuplicateHash);
        }
    }
    store_err(err)
}
