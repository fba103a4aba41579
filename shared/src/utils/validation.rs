//! Input shape validation for registration and login payloads

use once_cell::sync::Lazy;
use regex::Regex;

/// Username: 3-32 characters, letters, digits, underscore, hyphen
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("invalid username regex"));

/// Pragmatic email shape check; full RFC validation is not the goal
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Check whether a username has an acceptable shape
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username)
}

/// Check whether an email address has an acceptable shape
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_PATTERN.is_match(email)
}

/// Check whether a plaintext password meets the length policy
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_42"));
        assert!(is_valid_username("team-lead"));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("way-too-long-for-a-username-field-okay"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_length_policy() {
        assert!(is_valid_password("longenough"));
        assert!(!is_valid_password("short"));
    }
}
