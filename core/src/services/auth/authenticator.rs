//! Per-request bearer-token authentication.

use tracing::debug;

use convo_shared::config::JwtConfig;

use crate::domain::value_objects::Principal;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::services::token::ClaimsCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Result of authenticating one request
///
/// `Anonymous` means no bearer credential was presented; whether an
/// anonymous request may proceed is a policy decision made elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Principal),
    Anonymous,
}

impl AuthOutcome {
    /// The principal, if the request authenticated
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthOutcome::Authenticated(principal) => Some(principal),
            AuthOutcome::Anonymous => None,
        }
    }
}

/// Authenticates inbound requests from their `Authorization` header value
///
/// Runs exactly once per request and its outcome is final: the caller
/// replaces any previously attached request context with the returned
/// outcome, so no stale principal can survive a failed check.
pub struct RequestAuthenticator {
    codec: ClaimsCodec,
}

impl RequestAuthenticator {
    /// Creates an authenticator from the JWT configuration
    pub fn new(config: &JwtConfig) -> DomainResult<Self> {
        Ok(Self {
            codec: ClaimsCodec::new(config)?,
        })
    }

    /// Creates an authenticator sharing an existing codec
    pub fn from_codec(codec: ClaimsCodec) -> Self {
        Self { codec }
    }

    /// Decides authentication for one request
    ///
    /// A missing header or one without the `Bearer ` prefix passes through
    /// as `Anonymous` rather than being rejected. A presented bearer token
    /// is verified with full strictness; any failure yields the uniform
    /// `Unauthenticated` error with the actual cause only logged.
    pub fn authenticate(&self, authorization: Option<&str>) -> DomainResult<AuthOutcome> {
        let token = match authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) {
            Some(token) => token.trim(),
            None => return Ok(AuthOutcome::Anonymous),
        };

        let claims = self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            DomainError::Auth(AuthError::Unauthenticated)
        })?;

        let principal = Principal::from_access_claims(&claims).map_err(|e| {
            debug!(error = %e, "verified token does not have the access shape");
            DomainError::Auth(AuthError::Unauthenticated)
        })?;

        Ok(AuthOutcome::Authenticated(principal))
    }
}
