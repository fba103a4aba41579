//! Unit tests for claim signing and verification

use chrono::Utc;
use uuid::Uuid;

use convo_shared::config::JwtConfig;

use crate::domain::entities::token::{Claims, TokenKind};
use crate::domain::entities::user::Role;
use crate::errors::{DomainError, TokenError};
use crate::services::token::ClaimsCodec;

const SECRET: &str = "unit-test-secret-key-of-32-bytes!";
const OTHER_SECRET: &str = "a-completely-different-32b-secret";
const SKEW_SECS: u64 = 30;

fn test_config() -> JwtConfig {
    JwtConfig::new(SECRET).with_clock_skew_secs(SKEW_SECS)
}

fn codec() -> ClaimsCodec {
    ClaimsCodec::new(&test_config()).unwrap()
}

fn access_claims_expiring_at(exp: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: Uuid::new_v4().to_string(),
        iss: "convo".to_string(),
        aud: "convo-api".to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp,
        kind: TokenKind::Access,
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        role: Some(Role::User),
        org_tags: Some("eng".to_string()),
    }
}

fn valid_access_claims() -> Claims {
    access_claims_expiring_at(Utc::now().timestamp() + 900)
}

#[test]
fn test_sign_verify_roundtrip() {
    let codec = codec();
    let claims = valid_access_claims();

    let token = codec.sign(&claims).unwrap();
    // Three dot-separated base64url segments
    assert_eq!(token.split('.').count(), 3);

    let verified = codec.verify(&token).unwrap();
    assert_eq!(verified, claims);
}

#[test]
fn test_token_signed_with_other_key_never_verifies() {
    let codec = codec();
    let other = ClaimsCodec::new(&JwtConfig::new(OTHER_SECRET)).unwrap();

    let token = other.sign(&valid_access_claims()).unwrap();
    let err = codec.verify(&token).unwrap_err();

    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidSignature)
    ));
}

#[test]
fn test_malformed_token_rejected() {
    let codec = codec();

    for garbage in ["", "not-a-token", "a.b", "a.b.c.d", "!!.??.!!"] {
        let err = codec.verify(garbage).unwrap_err();
        assert!(
            matches!(err, DomainError::Token(TokenError::Malformed)),
            "expected Malformed for {garbage:?}"
        );
    }
}

#[test]
fn test_issuer_mismatch() {
    let codec = codec();
    let mut claims = valid_access_claims();
    claims.iss = "someone-else".to_string();

    let token = codec.sign(&claims).unwrap();
    let err = codec.verify(&token).unwrap_err();

    assert!(matches!(
        err,
        DomainError::Token(TokenError::IssuerMismatch)
    ));
}

#[test]
fn test_audience_mismatch() {
    let codec = codec();
    let mut claims = valid_access_claims();
    claims.aud = "other-api".to_string();

    let token = codec.sign(&claims).unwrap();
    let err = codec.verify(&token).unwrap_err();

    assert!(matches!(
        err,
        DomainError::Token(TokenError::AudienceMismatch)
    ));
}

#[test]
fn test_expiry_within_skew_tolerated() {
    let codec = codec();
    let claims = access_claims_expiring_at(Utc::now().timestamp() - (SKEW_SECS as i64 - 1));

    let token = codec.sign(&claims).unwrap();
    assert!(codec.verify(&token).is_ok());
}

#[test]
fn test_expiry_past_skew_rejected() {
    let codec = codec();
    let claims = access_claims_expiring_at(Utc::now().timestamp() - (SKEW_SECS as i64 + 1));

    let token = codec.sign(&claims).unwrap();
    let err = codec.verify(&token).unwrap_err();

    assert!(matches!(err, DomainError::Token(TokenError::Expired)));
}

#[test]
fn test_decode_allow_expired_tolerates_expiry_only() {
    let codec = codec();
    let claims = access_claims_expiring_at(Utc::now().timestamp() - 3600);
    let token = codec.sign(&claims).unwrap();

    // Expiry is tolerated...
    let decoded = codec.decode_allow_expired(&token).unwrap();
    assert_eq!(decoded.sub, claims.sub);

    // ...but a bad signature is still fatal
    let other = ClaimsCodec::new(&JwtConfig::new(OTHER_SECRET)).unwrap();
    let forged = other.sign(&claims).unwrap();
    assert!(codec.decode_allow_expired(&forged).is_err());
}

#[test]
fn test_short_secret_is_a_construction_error() {
    let err = ClaimsCodec::new(&JwtConfig::new("short")).unwrap_err();
    assert!(matches!(err, DomainError::Config { .. }));
}
