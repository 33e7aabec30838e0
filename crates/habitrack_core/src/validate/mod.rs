//! Pure input validation.
//!
//! # Responsibility
//! - Turn raw submitted strings into typed drafts ready for persistence.
//! - Collect every field-level problem instead of stopping at the first one.
//!
//! # Invariants
//! - Validation never touches storage. Checks that need the store (username
//!   availability, progress date uniqueness) live in the services and are
//!   reported through the same `ValidationErrors` type.

pub mod account;
pub mod goal;
pub mod habit;
pub mod progress;

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length, in characters, of habit and goal titles.
pub const TITLE_MAX_CHARS: usize = 255;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One validation message, optionally bound to a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// `None` for messages about the form as a whole.
    pub field: Option<&'static str>,
    pub message: String,
}

/// Ordered collection of validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection holding one field-level message.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Builds a collection holding one form-level message.
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_form(message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field),
            message: message.into(),
        });
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages attached to `field`, in insertion order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.field == Some(field))
            .map(|error| error.message.as_str())
    }

    /// Messages not bound to any field.
    pub fn form_errors(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(|error| error.field.is_none())
            .map(|error| error.message.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// Returns `Ok(value)` when no message was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match error.field {
                Some(field) => write!(f, "{field}: {}", error.message)?,
                None => write!(f, "{}", error.message)?,
            }
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "This field is required.");
        return None;
    }
    Some(trimmed.to_string())
}

pub(crate) fn title(errors: &mut ValidationErrors, value: &str) -> Option<String> {
    let title = required_text(errors, "title", value)?;
    let length = title.chars().count();
    if length > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!(
                "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {length})."
            ),
        );
        return None;
    }
    Some(title)
}

pub(crate) fn required_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) -> Option<NaiveDate> {
    let trimmed = required_text(errors, field, value)?;
    match NaiveDate::parse_from_str(&trimmed, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date (YYYY-MM-DD).");
            None
        }
    }
}

/// Interprets an HTML checkbox value: absent means unchecked.
pub fn checkbox(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(raw) => !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "off" | "0"
        ),
    }
}

/// Formats a date the way forms submit it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{checkbox, required_date, ValidationErrors};

    #[test]
    fn checkbox_treats_missing_and_falsy_values_as_unchecked() {
        assert!(!checkbox(None));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(Some("false")));
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
    }

    #[test]
    fn errors_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "This field is required.");
        errors.add_form("Passwords do not match.");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field("title").collect::<Vec<_>>(),
            vec!["This field is required."]
        );
        assert_eq!(
            errors.form_errors().collect::<Vec<_>>(),
            vec!["Passwords do not match."]
        );
        assert!(!errors.has_field("date"));
    }

    #[test]
    fn date_requires_iso_format() {
        let mut errors = ValidationErrors::new();
        assert!(required_date(&mut errors, "date", "2025-02-30").is_none());
        assert!(required_date(&mut errors, "date", "").is_none());
        let parsed = required_date(&mut errors, "date", " 2025-02-28 ");
        assert!(parsed.is_some());
        assert_eq!(errors.for_field("date").count(), 2);
    }
}
