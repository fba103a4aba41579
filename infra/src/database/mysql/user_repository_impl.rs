//! MySQL implementation of the UserRepository trait.
//!
//! Backing table:
//!
//! ```sql
//! CREATE TABLE users (
//!     id            CHAR(36)     NOT NULL PRIMARY KEY,
//!     username      VARCHAR(32)  NOT NULL,
//!     email         VARCHAR(254) NOT NULL,
//!     password_hash VARCHAR(100) NOT NULL,
//!     role          VARCHAR(16)  NOT NULL,
//!     org_tags      VARCHAR(255) NOT NULL DEFAULT '',
//!     created_at    DATETIME(6)  NOT NULL,
//!     updated_at    DATETIME(6)  NOT NULL,
//!     UNIQUE KEY idx_users_username (username),
//!     UNIQUE KEY idx_users_email (email)
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use convo_core::domain::entities::user::{Role, User};
use convo_core::errors::{DomainError, DomainResult};
use convo_core::repositories::UserRepository;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, org_tags, created_at, updated_at";

/// MySQL-backed user repository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new repository over a connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> DomainResult<User> {
        let id: String = row.try_get("id").map_err(store_err)?;
        let role: String = row.try_get("role").map_err(store_err)?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("invalid user row UUID: {}", e),
            })?,
            username: row.try_get("username").map_err(store_err)?,
            email: row.try_get("email").map_err(store_err)?,
            password_hash: row.try_get("password_hash").map_err(store_err)?,
            role: role.parse::<Role>().map_err(|message| DomainError::Internal { message })?,
            org_tags: row.try_get("org_tags").map_err(store_err)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(store_err)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(store_err)?,
        })
    }

    async fn find_by_column(&self, query: &str, value: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? LIMIT 1");
        self.find_by_column(&query, &id.to_string()).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? LIMIT 1");
        self.find_by_column(&query, username).await
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? LIMIT 1");
        self.find_by_column(&query, email).await
    }

    async fn insert(&self, user: User) -> DomainResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, role, org_tags, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.org_tags)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(user)
    }
}

fn store_err(err: sqlx::Error) -> DomainError {
    DomainError::Store {
        message: err.to_string(),
    }
}
