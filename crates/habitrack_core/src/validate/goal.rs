//! Goal form validation.

use crate::model::goal::MAX_PROGRESS_PERCENTAGE;
use crate::validate::{checkbox, required_date, title, ValidationErrors};
use chrono::NaiveDate;
use serde::Deserialize;

/// Raw goal form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoalInput {
    pub title: String,
    pub description: String,
    pub target_date: String,
    pub is_completed: Option<String>,
    /// Blank means `0`.
    pub progress_percentage: String,
    pub progress_notes: String,
}

/// Validated goal fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub target_date: NaiveDate,
    pub is_completed: bool,
    pub progress_percentage: u8,
    pub progress_notes: String,
}

impl GoalInput {
    pub fn validate(&self) -> Result<GoalDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = title(&mut errors, &self.title);
        let target_date = required_date(&mut errors, "target_date", &self.target_date);
        let progress_percentage = parse_percentage(&mut errors, &self.progress_percentage);

        match (title, target_date, progress_percentage) {
            (Some(title), Some(target_date), Some(progress_percentage)) if errors.is_empty() => {
                Ok(GoalDraft {
                    title,
                    description: self.description.trim().to_string(),
                    target_date,
                    is_completed: checkbox(self.is_completed.as_deref()),
                    progress_percentage,
                    progress_notes: self.progress_notes.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

fn parse_percentage(errors: &mut ValidationErrors, value: &str) -> Option<u8> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    let Ok(parsed) = trimmed.parse::<i64>() else {
        errors.add("progress_percentage", "Enter a whole number.");
        return None;
    };

    if parsed < 0 {
        errors.add(
            "progress_percentage",
            "Ensure this value is greater than or equal to 0.",
        );
        return None;
    }
    if parsed > i64::from(MAX_PROGRESS_PERCENTAGE) {
        errors.add(
            "progress_percentage",
            format!("Ensure this value is less than or equal to {MAX_PROGRESS_PERCENTAGE}."),
        );
        return None;
    }

    u8::try_from(parsed).ok()
}

#[cfg(test)]
mod tests {
    use super::GoalInput;

    fn input(percentage: &str) -> GoalInput {
        GoalInput {
            title: "Learn Rust".to_string(),
            target_date: "2025-12-31".to_string(),
            progress_percentage: percentage.to_string(),
            ..GoalInput::default()
        }
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert_eq!(input("0").validate().unwrap().progress_percentage, 0);
        assert_eq!(input("100").validate().unwrap().progress_percentage, 100);
    }

    #[test]
    fn percentage_outside_range_is_rejected() {
        for value in ["101", "-1", "250", "4.5", "lots"] {
            let errors = input(value).validate().unwrap_err();
            assert!(
                errors.has_field("progress_percentage"),
                "value {value} should be rejected"
            );
        }
    }

    #[test]
    fn blank_percentage_defaults_to_zero_and_completion_to_false() {
        let draft = input("").validate().unwrap();
        assert_eq!(draft.progress_percentage, 0);
        assert!(!draft.is_completed);
    }

    #[test]
    fn missing_target_date_is_rejected() {
        let mut raw = input("10");
        raw.target_date = String::new();
        assert!(raw.validate().unwrap_err().has_field("target_date"));
    }
}
