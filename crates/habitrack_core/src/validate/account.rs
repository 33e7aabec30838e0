//! Registration and login form validation.
//!
//! Password values only ever live in these structs and in the hasher; they
//! are redacted from `Debug` output.

use crate::validate::{required_text, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Maximum username length in characters.
pub const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Message reported when password and confirmation differ.
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Raw registration form submission.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl Debug for RegistrationInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Registration data that passed shape checks. Username availability is
/// checked later against the store.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Debug for RegistrationDraft {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationDraft")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegistrationInput {
    pub fn validate(&self) -> Result<RegistrationDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = required_text(&mut errors, "username", &self.username).filter(|name| {
            if name.chars().count() > USERNAME_MAX_CHARS {
                errors.add(
                    "username",
                    format!("Ensure this value has at most {USERNAME_MAX_CHARS} characters."),
                );
                return false;
            }
            if !USERNAME_RE.is_match(name) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
                return false;
            }
            true
        });

        let email = required_text(&mut errors, "email", &self.email).filter(|email| {
            if EMAIL_RE.is_match(email) {
                true
            } else {
                errors.add("email", "Enter a valid email address.");
                false
            }
        });

        // Passwords are compared verbatim; whitespace is significant.
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        if self.password_confirm.is_empty() {
            errors.add("password_confirm", "This field is required.");
        }
        if !self.password.is_empty()
            && !self.password_confirm.is_empty()
            && self.password != self.password_confirm
        {
            errors.add_form(PASSWORD_MISMATCH);
        }

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(RegistrationDraft {
                username,
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Raw login form submission.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl Debug for LoginInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginInput {
    /// Checks that both fields are present. Credential checks happen in the
    /// auth service.
    pub fn validate(&self) -> Result<(String, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = required_text(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        match username {
            Some(username) if errors.is_empty() => Ok((username, self.password.clone())),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginInput, RegistrationInput, PASSWORD_MISMATCH};

    fn registration(password: &str, confirm: &str) -> RegistrationInput {
        RegistrationInput {
            username: "noor".to_string(),
            email: "noor@example.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn mismatched_passwords_are_a_form_error() {
        let errors = registration("x", "y").validate().unwrap_err();
        assert_eq!(errors.form_errors().collect::<Vec<_>>(), vec![PASSWORD_MISMATCH]);
    }

    #[test]
    fn matching_passwords_pass() {
        let draft = registration("s3cret!", "s3cret!").validate().unwrap();
        assert_eq!(draft.username, "noor");
    }

    #[test]
    fn missing_fields_are_reported_individually() {
        let errors = RegistrationInput::default().validate().unwrap_err();
        for field in ["username", "email", "password", "password_confirm"] {
            assert!(errors.has_field(field), "{field} should be required");
        }
    }

    #[test]
    fn username_rejects_spaces_and_email_requires_domain() {
        let mut raw = registration("a", "a");
        raw.username = "two words".to_string();
        raw.email = "nobody@localhost".to_string();
        let errors = raw.validate().unwrap_err();
        assert!(errors.has_field("username"));
        assert!(errors.has_field("email"));
    }

    #[test]
    fn debug_never_prints_passwords() {
        let rendered = format!("{:?}", registration("hunter2", "hunter2"));
        assert!(!rendered.contains("hunter2"));
        let login = LoginInput {
            username: "noor".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{login:?}").contains("hunter2"));
    }
}
