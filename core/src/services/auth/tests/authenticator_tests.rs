//! Unit tests for per-request bearer authentication

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use convo_shared::config::JwtConfig;

use crate::domain::entities::token::{Claims, TokenKind};
use crate::domain::entities::user::{Role, User};
use crate::errors::{AuthError, DomainError};
use crate::repositories::token::mock::MockRefreshTokenStore;
use crate::repositories::user::mock::MockUserRepository;
use crate::services::auth::{AuthOutcome, RequestAuthenticator};
use crate::services::token::{ClaimsCodec, TokenLifecycle};

const SECRET: &str = "unit-test-secret-key-of-32-bytes!";
const SKEW_SECS: u64 = 30;

fn test_config() -> JwtConfig {
    JwtConfig::new(SECRET).with_clock_skew_secs(SKEW_SECS)
}

fn authenticator() -> RequestAuthenticator {
    RequestAuthenticator::new(&test_config()).unwrap()
}

async fn issued_tokens() -> (String, String, User) {
    let user = User::new("alice", "alice@example.com", "$2b$12$hash", "eng");
    let users = Arc::new(MockUserRepository::with_users([user.clone()]));
    let store = Arc::new(MockRefreshTokenStore::new());
    let lifecycle = TokenLifecycle::new(store, users, &test_config()).unwrap();
    let pair = lifecycle.issue(&user).await.unwrap();
    (pair.access_token, pair.refresh_token, user)
}

fn assert_unauthenticated(err: DomainError) {
    assert!(
        matches!(err, DomainError::Auth(AuthError::Unauthenticated)),
        "expected Unauthenticated, got {err:?}"
    );
}

#[tokio::test]
async fn test_valid_bearer_token_yields_principal() {
    let auth = authenticator();
    let (access, _, user) = issued_tokens().await;

    let header = format!("Bearer {access}");
    let outcome = auth.authenticate(Some(&header)).unwrap();

    let principal = outcome.principal().expect("must be authenticated");
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.username, "alice");
    assert_eq!(principal.email, "alice@example.com");
    assert_eq!(principal.role, Role::User);
    assert_eq!(principal.org_tags, "eng");
}

#[test]
fn test_missing_header_is_anonymous_not_rejected() {
    let auth = authenticator();
    assert_eq!(auth.authenticate(None).unwrap(), AuthOutcome::Anonymous);
}

#[test]
fn test_non_bearer_header_is_anonymous() {
    let auth = authenticator();
    for header in ["Basic dXNlcjpwYXNz", "bearer lowercase-prefix", "Token abc"] {
        assert_eq!(
            auth.authenticate(Some(header)).unwrap(),
            AuthOutcome::Anonymous,
            "header {header:?} must pass through unauthenticated"
        );
    }
}

#[tokio::test]
async fn test_refresh_token_rejected_on_request_path() {
    let auth = authenticator();
    let (_, refresh, _) = issued_tokens().await;

    let header = format!("Bearer {refresh}");
    assert_unauthenticated(auth.authenticate(Some(&header)).unwrap_err());
}

#[test]
fn test_garbage_bearer_token_rejected() {
    let auth = authenticator();
    assert_unauthenticated(auth.authenticate(Some("Bearer not.a.token")).unwrap_err());
}

#[test]
fn test_token_from_other_key_rejected() {
    let auth = authenticator();
    let other_codec =
        ClaimsCodec::new(&JwtConfig::new("a-completely-different-32b-secret")).unwrap();
    let claims = access_claims_expiring_at(Utc::now().timestamp() + 900);
    let forged = other_codec.sign(&claims).unwrap();

    let header = format!("Bearer {forged}");
    assert_unauthenticated(auth.authenticate(Some(&header)).unwrap_err());
}

#[test]
fn test_expiry_honors_clock_skew_boundary() {
    let auth = authenticator();
    let codec = ClaimsCodec::new(&test_config()).unwrap();

    let just_inside = access_claims_expiring_at(Utc::now().timestamp() - (SKEW_SECS as i64 - 2));
    let header = format!("Bearer {}", codec.sign(&just_inside).unwrap());
    assert!(auth.authenticate(Some(&header)).is_ok());

    let just_outside = access_claims_expiring_at(Utc::now().timestamp() - (SKEW_SECS as i64 + 2));
    let header = format!("Bearer {}", codec.sign(&just_outside).unwrap());
    assert_unauthenticated(auth.authenticate(Some(&header)).unwrap_err());
}

fn access_claims_expiring_at(exp: i64) -> Claims {
    Claims {
        sub: Uuid::new_v4().to_string(),
        iss: "convo".to_string(),
        aud: "convo-api".to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: Utc::now().timestamp(),
        exp,
        kind: TokenKind::Access,
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        role: Some(Role::User),
        org_tags: Some(String::new()),
    }
}
