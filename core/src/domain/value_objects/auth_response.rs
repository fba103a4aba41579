//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::{Role, User};

/// Response returned after successful login, registration, or refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Signed access token for API authentication
    pub access_token: String,

    /// Signed refresh token for obtaining the next pair
    pub refresh_token: String,

    /// Always `"Bearer"`
    pub token_type: String,

    /// Login name of the authenticated user
    pub username: String,

    /// Authorization role of the authenticated user
    pub role: Role,

    /// Organization tags of the authenticated user
    pub org_tags: String,

    /// Access token lifetime in seconds
    pub expires_in_seconds: i64,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair and its user
    pub fn from_token_pair(pair: TokenPair, user: &User) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            username: user.username.clone(),
            role: user.role,
            org_tags: user.org_tags.clone(),
            expires_in_seconds: pair.expires_in,
        }
    }
}
