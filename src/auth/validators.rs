// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::Credentials;
use crate::common::{ValidationResult, Validator};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;
const MAX_EMAIL_LEN: usize = 254;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && email_regex().is_match(email)
}

// ============================================================================
// Registration Validator
// ============================================================================

pub struct RegistrationValidator;

impl Validator<Credentials> for RegistrationValidator {
    fn validate(&self, data: &Credentials) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = data.email.trim();
        if email.is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_valid_email(email) {
            result.add_error("email", "Email must be a valid email address");
        }

        // Password length is counted in characters, not bytes
        let password_len = data.password.chars().count();
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        } else if password_len < MIN_PASSWORD_LEN {
            result.add_error(
                "password",
                &format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        } else if password_len > MAX_PASSWORD_LEN {
            result.add_error(
                "password",
                &format!("Password must be at most {} characters", MAX_PASSWORD_LEN),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let result = RegistrationValidator.validate(&creds("a@x.com", "secret1"));
        assert!(result.is_valid);
    }

    #[test]
    fn test_email_shape() {
        for bad in ["", "plain", "a@b", "a b@x.com", "@x.com"] {
            let result = RegistrationValidator.validate(&creds(bad, "secret1"));
            assert!(result.has_error_for("email"), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_password_length_bounds() {
        let short = RegistrationValidator.validate(&creds("a@x.com", "12345"));
        assert!(short.has_error_for("password"));

        let exact = RegistrationValidator.validate(&creds("a@x.com", "123456"));
        assert!(exact.is_valid);

        let long = RegistrationValidator.validate(&creds("a@x.com", &"x".repeat(129)));
        assert!(long.has_error_for("password"));
    }

    #[test]
    fn test_errors_accumulate() {
        let result = RegistrationValidator.validate(&creds("nope", ""));

        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.summary(),
            "Email must be a valid email address; Password is required"
        );
    }
}
