//! Habit form validation.

use crate::model::habit::Frequency;
use crate::validate::{title, ValidationErrors};
use serde::Deserialize;

/// Raw habit form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HabitInput {
    pub title: String,
    pub description: String,
    pub frequency: String,
}

/// Validated habit fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
}

impl HabitInput {
    pub fn validate(&self) -> Result<HabitDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = title(&mut errors, &self.title);

        let frequency = if self.frequency.trim().is_empty() {
            errors.add("frequency", "This field is required.");
            None
        } else {
            let parsed = Frequency::parse(&self.frequency);
            if parsed.is_none() {
                errors.add(
                    "frequency",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.frequency.trim()
                    ),
                );
            }
            parsed
        };

        match (title, frequency) {
            (Some(title), Some(frequency)) if errors.is_empty() => Ok(HabitDraft {
                title,
                description: self.description.trim().to_string(),
                frequency,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HabitInput;
    use crate::model::habit::Frequency;

    #[test]
    fn valid_input_is_trimmed() {
        let draft = HabitInput {
            title: "  Morning run ".to_string(),
            description: " 5k ".to_string(),
            frequency: "daily".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(draft.title, "Morning run");
        assert_eq!(draft.description, "5k");
        assert_eq!(draft.frequency, Frequency::Daily);
    }

    #[test]
    fn blank_title_and_unknown_frequency_are_both_reported() {
        let errors = HabitInput {
            title: "   ".to_string(),
            description: String::new(),
            frequency: "hourly".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(errors.has_field("title"));
        assert!(errors.has_field("frequency"));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let errors = HabitInput {
            title: "x".repeat(256),
            description: String::new(),
            frequency: "weekly".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(errors.has_field("title"));
    }
}
