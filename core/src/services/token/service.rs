//! Token lifecycle implementation: issuance, rotation, revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use convo_shared::config::JwtConfig;

use crate::domain::entities::token::{RefreshTokenRecord, TokenKind, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{RefreshTokenStore, UserRepository};

use super::codec::ClaimsCodec;
use super::issuer::TokenIssuer;

/// Hashes a token's wire string for storage and lookup
///
/// The raw string is never persisted; every store interaction goes through
/// this digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// The principal authority over refresh-token chains
///
/// Owns issuance (login/register), rotation, and bulk revocation (logout).
/// Holds no in-process locks; the store's uniqueness constraint and atomic
/// rotation arbitrate concurrent requests.
pub struct TokenLifecycle<S, U>
where
    S: RefreshTokenStore,
    U: UserRepository,
{
    store: Arc<S>,
    users: Arc<U>,
    codec: ClaimsCodec,
    issuer: TokenIssuer,
    /// Window past a refresh token's expiry during which rotation is still
    /// honored: clock skew plus the configured explicit grace period.
    rotation_grace: Duration,
}

impl<S, U> TokenLifecycle<S, U>
where
    S: RefreshTokenStore,
    U: UserRepository,
{
    /// Creates the lifecycle service
    ///
    /// Fails with a configuration error (fatal at startup) when the JWT
    /// settings are unusable, e.g. a signing secret under 256 bits.
    pub fn new(store: Arc<S>, users: Arc<U>, config: &JwtConfig) -> DomainResult<Self> {
        let codec = ClaimsCodec::new(config)?;
        let issuer = TokenIssuer::new(config);
        let rotation_grace =
            Duration::seconds((config.clock_skew_secs + config.refresh_grace_secs) as i64);

        Ok(Self {
            store,
            users,
            codec,
            issuer,
            rotation_grace,
        })
    }

    /// The codec, for wiring up a `RequestAuthenticator` over the same key
    pub fn codec(&self) -> &ClaimsCodec {
        &self.codec
    }

    /// Issues a fresh access/refresh pair for a user
    ///
    /// Persists the refresh token's hash; a hash collision (store
    /// uniqueness violation) is retried once with a fresh token id.
    pub async fn issue(&self, user: &User) -> DomainResult<TokenPair> {
        let access_claims = self.issuer.access_claims(user);
        let access_token = self.codec.sign(&access_claims)?;
        let access_expires_at = timestamp_to_datetime(access_claims.exp)?;

        let (refresh_token, refresh_record) = self.persist_new_refresh(user).await?;

        info!(user_id = %user.id, token_id = %refresh_record.id, "issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at: refresh_record.expires_at,
            expires_in: self.issuer.access_ttl_secs(),
        })
    }

    /// Rotates a presented refresh token into a new pair
    ///
    /// The presented string must carry a valid signature before anything is
    /// done with its subject; acting on a forged subject would let an
    /// attacker choose whose tokens get revoked. Expiry alone is tolerated
    /// within the grace window, since the authoritative expiry check runs
    /// against the stored row. Every failure is normalized to
    /// `InvalidRefreshToken`; the specific cause is only logged.
    pub async fn rotate(&self, presented: &str) -> DomainResult<(User, TokenPair)> {
        let claims = match self.codec.verify(presented) {
            Ok(claims) => claims,
            Err(DomainError::Token(TokenError::Expired)) => {
                let claims = self.codec.decode_allow_expired(presented).map_err(|e| {
                    debug!(error = %e, "expired refresh token failed relaxed decode");
                    DomainError::Token(TokenError::InvalidRefreshToken)
                })?;
                if Utc::now().timestamp() > claims.exp + self.rotation_grace.num_seconds() {
                    debug!("refresh token expired beyond the grace window");
                    return Err(DomainError::Token(TokenError::InvalidRefreshToken));
                }
                claims
            }
            Err(e) => {
                debug!(error = %e, "refresh token failed verification");
                return Err(DomainError::Token(TokenError::InvalidRefreshToken));
            }
        };

        if claims.kind != TokenKind::Refresh {
            debug!("non-refresh token presented for rotation");
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidRefreshToken))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                debug!(%user_id, "refresh token subject no longer exists");
                DomainError::Token(TokenError::InvalidRefreshToken)
            })?;

        // Covers already-rotated, forged, and foreign tokens alike.
        let token_hash = hash_token(presented);
        let record = self
            .store
            .find_active_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user.id, "no active record for presented refresh token");
                DomainError::Token(TokenError::InvalidRefreshToken)
            })?;

        // Lazy expiry cleanup on touch: the row is the authority.
        if Utc::now() > record.expires_at + self.rotation_grace {
            self.store.revoke(record.id).await?;
            info!(user_id = %user.id, token_id = %record.id, "revoked expired refresh token on touch");
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        let access_claims = self.issuer.access_claims(&user);
        let access_token = self.codec.sign(&access_claims)?;
        let access_expires_at = timestamp_to_datetime(access_claims.exp)?;

        let (refresh_token, replacement) = self.build_refresh(&user)?;
        let (refresh_token, saved) = match self.store.rotate(record.id, replacement).await {
            Ok(saved) => (refresh_token, saved),
            Err(DomainError::Token(TokenError::DuplicateHash)) => {
                warn!(user_id = %user.id, "replacement hash collision, retrying with a fresh token id");
                let (token, replacement) = self.build_refresh(&user)?;
                let saved = self.store.rotate(record.id, replacement).await.map_err(|e| {
                    match e {
                        DomainError::Token(TokenError::DuplicateHash) => DomainError::Internal {
                            message: "refresh token hash collided twice".to_string(),
                        },
                        other => other,
                    }
                })?;
                (token, saved)
            }
            Err(DomainError::Token(TokenError::InvalidRefreshToken)) => {
                debug!(user_id = %user.id, token_id = %record.id, "lost rotation race");
                return Err(DomainError::Token(TokenError::InvalidRefreshToken));
            }
            Err(e) => return Err(e),
        };

        info!(
            user_id = %user.id,
            revoked = %record.id,
            issued = %saved.id,
            "rotated refresh token"
        );

        let pair = TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at: saved.expires_at,
            expires_in: self.issuer.access_ttl_secs(),
        };
        Ok((user, pair))
    }

    /// Revokes every active refresh token owned by the user
    ///
    /// Already-issued access tokens are stateless and unaffected; they
    /// simply expire on their own schedule. A login committing concurrently
    /// with this call may survive it (accepted race, last writer wins).
    pub async fn logout(&self, user_id: Uuid) -> DomainResult<usize> {
        let revoked = self.store.revoke_all_for_user(user_id).await?;
        info!(%user_id, revoked, "revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Verifies an access token with full strictness
    pub fn verify_access(&self, token: &str) -> DomainResult<crate::domain::entities::token::Claims> {
        let claims = self.codec.verify(token)?;
        if claims.kind != TokenKind::Access {
            return Err(DomainError::Token(TokenError::Malformed));
        }
        Ok(claims)
    }

    /// Signs a new refresh token and builds its store record
    fn build_refresh(&self, user: &User) -> DomainResult<(String, RefreshTokenRecord)> {
        let claims = self.issuer.refresh_claims(user);
        let token = self.codec.sign(&claims)?;
        let expires_at = timestamp_to_datetime(claims.exp)?;
        let record = RefreshTokenRecord::new(user.id, hash_token(&token), expires_at);
        Ok((token, record))
    }

    /// Persists a new refresh token, retrying once on a hash collision
    async fn persist_new_refresh(
        &self,
        user: &User,
    ) -> DomainResult<(String, RefreshTokenRecord)> {
        let (token, record) = self.build_refresh(user)?;
        match self.store.save(record).await {
            Ok(saved) => Ok((token, saved)),
            Err(DomainError::Token(TokenError::DuplicateHash)) => {
                warn!(user_id = %user.id, "refresh token hash collision, retrying with a fresh token id");
                let (token, record) = self.build_refresh(user)?;
                let saved = self.store.save(record).await.map_err(|e| match e {
                    DomainError::Token(TokenError::DuplicateHash) => DomainError::Internal {
                        message: "refresh token hash collided twice".to_string(),
                    },
                    other => other,
                })?;
                Ok((token, saved))
            }
            Err(e) => Err(e),
        }
    }
}

fn timestamp_to_datetime(secs: i64) -> DomainResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| DomainError::Internal {
            message: "invalid expiry timestamp".to_string(),
        })
}
