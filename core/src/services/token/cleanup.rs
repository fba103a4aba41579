//! Periodic cleanup of refresh token rows past their retention window.
//!
//! Rows are never deleted on the request path; this service is the
//! out-of-band cleanup that bounds table growth while keeping revoked rows
//! around long enough for audit.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::{error, info};

use crate::errors::DomainResult;
use crate::repositories::RefreshTokenStore;

/// Configuration for the token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup, in seconds
    pub interval_secs: u64,
    /// How long revoked rows are retained for audit, in days
    pub retain_revoked_days: i64,
    /// Whether cleanup runs at all
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            retain_revoked_days: 30,
            enabled: true,
        }
    }
}

/// Deletes expired and long-revoked refresh token rows on a schedule
pub struct TokenCleanupService<S: RefreshTokenStore + 'static> {
    store: Arc<S>,
    config: TokenCleanupConfig,
}

impl<S: RefreshTokenStore> TokenCleanupService<S> {
    /// Creates a new cleanup service
    pub fn new(store: Arc<S>, config: TokenCleanupConfig) -> Self {
        Self { store, config }
    }

    /// Runs a single cleanup cycle
    pub async fn run_once(&self) -> DomainResult<usize> {
        if !self.config.enabled {
            return Ok(0);
        }

        let deleted = self
            .store
            .delete_expired(Duration::days(self.config.retain_revoked_days))
            .await?;

        if deleted > 0 {
            info!(deleted, "cleaned up refresh token rows past retention");
        }

        Ok(deleted)
    }

    /// Spawns the periodic cleanup loop on the current runtime
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(StdDuration::from_secs(self.config.interval_secs));
            // The first tick fires immediately; skip it so startup is quiet
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "token cleanup cycle failed");
                }
            }
        })
    }
}
