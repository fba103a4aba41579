//! Main authentication service implementation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use convo_shared::validation;

use crate::domain::entities::user::User;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{RefreshTokenStore, UserRepository};
use crate::services::token::TokenLifecycle;

use super::password::PasswordVerifier;

/// Registration payload
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub org_tags: String,
}

/// Authentication service for the complete login/register/refresh/logout flow
///
/// Composes the user repository, the delegated password primitive, and the
/// token lifecycle. Controllers call this and map the returned error kinds
/// to status codes.
pub struct AuthService<U, S, P>
where
    U: UserRepository,
    S: RefreshTokenStore,
    P: PasswordVerifier,
{
    users: Arc<U>,
    tokens: Arc<TokenLifecycle<S, U>>,
    passwords: P,
}

impl<U, S, P> AuthService<U, S, P>
where
    U: UserRepository,
    S: RefreshTokenStore,
    P: PasswordVerifier,
{
    /// Creates a new authentication service
    pub fn new(users: Arc<U>, tokens: Arc<TokenLifecycle<S, U>>, passwords: P) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Registers a new user and issues their first token pair
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<AuthResponse> {
        validate_registration(&request)?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(DomainError::Auth(AuthError::UsernameTaken));
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::Auth(AuthError::EmailTaken));
        }

        let password_hash = self.passwords.hash(&request.password)?;
        let user = User::new(
            request.username,
            request.email,
            password_hash,
            request.org_tags,
        );
        let user = self.users.insert(user).await?;

        info!(user_id = %user.id, username = %user.username, "registered new user");

        let pair = self.tokens.issue(&user).await?;
        Ok(AuthResponse::from_token_pair(pair, &user))
    }

    /// Checks credentials and issues a token pair
    ///
    /// Unknown username and wrong password collapse into one
    /// `InvalidCredentials` signal so the response cannot be used to probe
    /// for accounts.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResponse> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username, "login attempt for unknown username");
                return Err(DomainError::Auth(AuthError::InvalidCredentials));
            }
        };

        if !self.passwords.matches(password, &user.password_hash) {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        info!(user_id = %user.id, "login succeeded");

        let pair = self.tokens.issue(&user).await?;
        Ok(AuthResponse::from_token_pair(pair, &user))
    }

    /// Rotates a refresh token into a new pair
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let (user, pair) = self.tokens.rotate(refresh_token).await?;
        Ok(AuthResponse::from_token_pair(pair, &user))
    }

    /// Revokes every refresh token the user holds
    ///
    /// Access tokens already in the wild are untouched; they expire on
    /// their own schedule.
    pub async fn logout(&self, user_id: Uuid) -> DomainResult<()> {
        self.tokens.logout(user_id).await?;
        Ok(())
    }
}

fn validate_registration(request: &RegisterRequest) -> DomainResult<()> {
    if !validation::is_valid_username(&request.username) {
        return Err(DomainError::Validation {
            message: "invalid username".to_string(),
        });
    }
    if !validation::is_valid_email(&request.email) {
        return Err(DomainError::Validation {
            message: "invalid email".to_string(),
        });
    }
    if !validation::is_valid_password(&request.password) {
        return Err(DomainError::Validation {
            message: "password too short".to_string(),
        });
    }
    Ok(())
}
