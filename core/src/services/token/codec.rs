//! Signing and verification of the claim set.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::error;

use convo_shared::config::JwtConfig;

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, DomainResult, TokenError};

/// Binds a claim set to its wire string (three dot-separated base64url
/// segments) with an HMAC-SHA256 signature, and reverses that binding.
///
/// Construction fails when the configured secret is shorter than 256 bits;
/// that is a deployment error, never a request-time one.
#[derive(Clone)]
pub struct ClaimsCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expired_ok_validation: Validation,
}

impl std::fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsCodec").finish_non_exhaustive()
    }
}

impl ClaimsCodec {
    /// Creates a codec from the JWT configuration
    pub fn new(config: &JwtConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Config { message })?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // Leeway widens the expiry boundary only; issued-at is not validated
        validation.leeway = config.clock_skew_secs;
        validation.validate_nbf = false;

        let mut expired_ok_validation = validation.clone();
        expired_ok_validation.validate_exp = false;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            expired_ok_validation,
        })
    }

    /// Signs a claim set into its wire string
    pub fn sign(&self, claims: &Claims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to encode token");
            DomainError::Token(TokenError::GenerationFailed)
        })
    }

    /// Verifies a wire string with full strictness
    ///
    /// Checks signature, issuer, audience, and expiry (with the configured
    /// clock-skew leeway) and returns the claim set on success.
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::Token(map_jwt_error(&e)))
    }

    /// Verifies signature, issuer, and audience but tolerates expiry
    ///
    /// Used by the refresh flow to extract the subject of an expired token
    /// without ever trusting an unsigned one.
    pub fn decode_allow_expired(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.expired_ok_validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::Token(map_jwt_error(&e)))
    }
}

fn map_jwt_error(err: &jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
        ErrorKind::InvalidAudience => TokenError::AudienceMismatch,
        _ => TokenError::Malformed,
    }
}
