//! Habit progress form validation.

use crate::validate::{checkbox, required_date, ValidationErrors};
use chrono::NaiveDate;
use serde::Deserialize;

/// Raw progress form submission. `status` is `None` when the checkbox was
/// left unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgressInput {
    pub date: String,
    pub status: Option<String>,
}

/// Validated progress entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDraft {
    pub date: NaiveDate,
    pub status: bool,
}

impl ProgressInput {
    pub fn validate(&self) -> Result<ProgressDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date = required_date(&mut errors, "date", &self.date);
        let status = checkbox(self.status.as_deref());

        match date {
            Some(date) => errors.into_result(ProgressDraft { date, status }),
            None => Err(errors),
        }
    }
}
