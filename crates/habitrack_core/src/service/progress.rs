//! Progress aggregation.
//!
//! Pure functions turning a habit's progress entries into completion
//! statistics. Nothing here is cached; callers recompute per request.
//!
//! # Invariants
//! - `percent == completed * 100 / total` with integer truncation
//!   (1 of 3 is 33, never 34).
//! - No entries means 0 percent.
//! - `0 <= percent <= 100`.

use crate::model::habit::{Frequency, Habit, HabitProgress};
use crate::model::HabitId;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Completion statistics for one habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSummary {
    pub habit: Habit,
    pub completed_count: u32,
    pub total_count: u32,
    pub percent: u8,
    /// Consecutive completed periods ending now (see [`current_streak`]).
    pub current_streak: u32,
}

/// Truncated completion percentage.
pub fn completion_percent(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let percent = completed * 100 / u64::from(total);
    u8::try_from(percent).unwrap_or(100)
}

/// Summarizes the given entries, all of which are expected to belong to
/// `habit`.
pub fn summarize(habit: Habit, entries: &[HabitProgress], today: NaiveDate) -> HabitSummary {
    let total_count = count(entries.len());
    let completed_count = count(entries.iter().filter(|entry| entry.status).count());
    let current_streak = current_streak(habit.frequency, entries, today);
    HabitSummary {
        percent: completion_percent(completed_count, total_count),
        habit,
        completed_count,
        total_count,
        current_streak,
    }
}

/// Summarizes several habits from one mixed batch of entries, keeping the
/// order of `habits`. Entries of habits not in `habits` are ignored.
pub fn summarize_all(
    habits: Vec<Habit>,
    entries: &[HabitProgress],
    today: NaiveDate,
) -> Vec<HabitSummary> {
    let mut by_habit: HashMap<HabitId, Vec<HabitProgress>> = HashMap::new();
    for entry in entries {
        by_habit.entry(entry.habit_id).or_default().push(entry.clone());
    }

    habits
        .into_iter()
        .map(|habit| {
            let own = by_habit.remove(&habit.id).unwrap_or_default();
            summarize(habit, &own, today)
        })
        .collect()
}

/// Number of consecutive completed periods (days, Monday-based weeks or
/// calendar months, per `frequency`) ending in the current or the previous
/// period.
///
/// Completed entries dated after `today` are ignored. A streak whose newest
/// period is older than the previous period is broken and counts as 0.
pub fn current_streak(frequency: Frequency, entries: &[HabitProgress], today: NaiveDate) -> u32 {
    let current = period_index(frequency, today);
    let mut periods: Vec<i64> = entries
        .iter()
        .filter(|entry| entry.status && entry.date <= today)
        .map(|entry| period_index(frequency, entry.date))
        .collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();

    let Some(&latest) = periods.first() else {
        return 0;
    };
    if latest < current - 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in periods.windows(2) {
        if pair[0] - pair[1] != 1 {
            break;
        }
        streak += 1;
    }
    streak
}

fn period_index(frequency: Frequency, date: NaiveDate) -> i64 {
    let day = i64::from(date.num_days_from_ce());
    match frequency {
        Frequency::Daily => day,
        // Day 1 of the common era (0001-01-01) is a Monday.
        Frequency::Weekly => (day - 1).div_euclid(7),
        Frequency::Monthly => i64::from(date.year()) * 12 + i64::from(date.month0()),
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{completion_percent, current_streak, summarize, summarize_all};
    use crate::model::habit::{Frequency, Habit, HabitProgress};
    use crate::model::{HabitId, ProgressId, UserId};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: i64, frequency: Frequency) -> Habit {
        Habit {
            id: HabitId(id),
            user_id: UserId(1),
            title: format!("habit {id}"),
            description: String::new(),
            frequency,
            created_at: 0,
        }
    }

    fn entry(habit_id: i64, date: NaiveDate, status: bool) -> HabitProgress {
        HabitProgress {
            id: ProgressId(0),
            habit_id: HabitId(habit_id),
            date,
            status,
        }
    }

    #[test]
    fn percent_truncates_instead_of_rounding() {
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 66);
        assert_eq!(completion_percent(1, 2), 50);
        assert_eq!(completion_percent(29, 100), 29);
    }

    #[test]
    fn percent_is_zero_without_entries() {
        assert_eq!(completion_percent(0, 0), 0);
        let summary = summarize(habit(1, Frequency::Daily), &[], day(2025, 1, 1));
        assert_eq!(summary.percent, 0);
        assert_eq!(summary.total_count, 0);
    }

    #[test]
    fn percent_matches_integer_floor_for_all_small_counts() {
        for total in 1..=60u32 {
            for completed in 0..=total {
                let percent = completion_percent(completed, total);
                assert!(percent <= 100);
                assert_eq!(u32::from(percent), completed * 100 / total);
            }
        }
    }

    #[test]
    fn summary_counts_completed_entries() {
        let today = day(2025, 5, 10);
        let entries = vec![
            entry(1, day(2025, 5, 8), true),
            entry(1, day(2025, 5, 9), false),
            entry(1, day(2025, 5, 10), false),
        ];
        let summary = summarize(habit(1, Frequency::Daily), &entries, today);
        assert_eq!(summary.completed_count, 1);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.percent, 33);
    }

    #[test]
    fn daily_streak_counts_back_from_today_or_yesterday() {
        let today = day(2025, 5, 10);
        let entries = vec![
            entry(1, day(2025, 5, 9), true),
            entry(1, day(2025, 5, 8), true),
            entry(1, day(2025, 5, 7), true),
            entry(1, day(2025, 5, 5), true),
        ];
        assert_eq!(current_streak(Frequency::Daily, &entries, today), 3);
    }

    #[test]
    fn daily_streak_is_broken_by_gap_before_yesterday() {
        let today = day(2025, 5, 10);
        let entries = vec![entry(1, day(2025, 5, 8), true)];
        assert_eq!(current_streak(Frequency::Daily, &entries, today), 0);
    }

    #[test]
    fn streak_ignores_incomplete_and_future_entries() {
        let today = day(2025, 5, 10);
        let entries = vec![
            entry(1, day(2025, 5, 11), true),
            entry(1, day(2025, 5, 10), true),
            entry(1, day(2025, 5, 9), false),
            entry(1, day(2025, 5, 8), true),
        ];
        assert_eq!(current_streak(Frequency::Daily, &entries, today), 1);
    }

    #[test]
    fn weekly_streak_groups_by_monday_based_weeks() {
        // 2025-05-12 is a Monday.
        let today = day(2025, 5, 14);
        let entries = vec![
            entry(1, day(2025, 5, 13), true),
            entry(1, day(2025, 5, 11), true),
            entry(1, day(2025, 5, 5), true),
            entry(1, day(2025, 4, 28), true),
            entry(1, day(2025, 4, 14), true),
        ];
        assert_eq!(current_streak(Frequency::Weekly, &entries, today), 3);
    }

    #[test]
    fn monthly_streak_crosses_year_boundary() {
        let today = day(2025, 1, 20);
        let entries = vec![
            entry(1, day(2025, 1, 2), true),
            entry(1, day(2024, 12, 30), true),
            entry(1, day(2024, 11, 1), true),
            entry(1, day(2024, 9, 1), true),
        ];
        assert_eq!(current_streak(Frequency::Monthly, &entries, today), 3);
    }

    #[test]
    fn summarize_all_keeps_habit_order_and_splits_entries() {
        let today = day(2025, 5, 10);
        let entries = vec![
            entry(2, day(2025, 5, 10), true),
            entry(1, day(2025, 5, 10), false),
            entry(2, day(2025, 5, 9), false),
            entry(99, day(2025, 5, 9), true),
        ];
        let summaries = summarize_all(
            vec![habit(2, Frequency::Daily), habit(1, Frequency::Daily)],
            &entries,
            today,
        );
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].habit.id, HabitId(2));
        assert_eq!(summaries[0].percent, 50);
        assert_eq!(summaries[1].habit.id, HabitId(1));
        assert_eq!(summaries[1].percent, 0);
        assert_eq!(summaries[1].total_count, 1);
    }
}
