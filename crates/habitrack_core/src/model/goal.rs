//! Goal model.

use crate::model::{GoalId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound of `Goal::progress_percentage`.
pub const MAX_PROGRESS_PERCENTAGE: u8 = 100;

/// A user-defined objective with a self-reported progress percentage.
///
/// Unlike habit completion, `progress_percentage` is entered by the user and
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    /// Owning user. Immutable after creation.
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub target_date: NaiveDate,
    pub is_completed: bool,
    /// Always within `0..=100`.
    pub progress_percentage: u8,
    pub progress_notes: String,
}

impl Goal {
    /// Returns whether the target date has passed without completion.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.target_date < today
    }
}

#[cfg(test)]
mod tests {
    use super::Goal;
    use crate::model::{GoalId, UserId};
    use chrono::NaiveDate;

    fn goal(target: NaiveDate, is_completed: bool) -> Goal {
        Goal {
            id: GoalId(1),
            user_id: UserId(1),
            title: "Read 12 books".to_string(),
            description: String::new(),
            target_date: target,
            is_completed,
            progress_percentage: 40,
            progress_notes: String::new(),
        }
    }

    #[test]
    fn overdue_only_when_open_and_past_target() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let past = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert!(goal(past, false).is_overdue(today));
        assert!(!goal(past, true).is_overdue(today));
        assert!(!goal(today, false).is_overdue(today));
    }
}
