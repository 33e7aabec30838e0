//! Habit and habit progress models.
//!
//! # Invariants
//! - `Habit::created_at` is set once by storage and never changes.
//! - At most one `HabitProgress` exists per `(habit_id, date)`.

use crate::model::{HabitId, ProgressId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cadence on which a habit is expected to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// All cadences in display order.
    pub const ALL: [Frequency; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Stable storage/form value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Parses the storage/form value; case and surrounding whitespace are
    /// ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// A recurring activity tracked by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    /// Owning user. Immutable after creation.
    pub user_id: UserId,
    pub title: String,
    /// Empty string when the user left it blank.
    pub description: String,
    pub frequency: Frequency,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// One dated completion record for a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitProgress {
    pub id: ProgressId,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    /// `true` when the habit was completed on `date`.
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::{Frequency, HabitProgress};
    use crate::model::{HabitId, ProgressId};
    use chrono::NaiveDate;

    #[test]
    fn frequency_parse_accepts_any_case() {
        assert_eq!(Frequency::parse(" Weekly "), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("hourly"), None);
    }

    #[test]
    fn frequency_parse_inverts_as_str() {
        for frequency in Frequency::ALL {
            assert_eq!(Frequency::parse(frequency.as_str()), Some(frequency));
        }
    }

    #[test]
    fn progress_serializes_with_iso_date_and_plain_ids() {
        let entry = HabitProgress {
            id: ProgressId(3),
            habit_id: HabitId(9),
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            status: true,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 3, "habit_id": 9, "date": "2024-02-29", "status": true})
        );
        assert_eq!(
            serde_json::to_value(Frequency::Monthly).unwrap(),
            serde_json::json!("monthly")
        );
    }
}
