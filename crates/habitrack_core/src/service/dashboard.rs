//! Authenticated landing summary.

use crate::model::goal::Goal;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::repo::progress_repo::ProgressRepository;
use crate::service::access::RequestContext;
use crate::service::goal_service::GoalService;
use crate::service::habit_service::HabitService;
use crate::service::progress::HabitSummary;
use crate::service::ServiceResult;
use chrono::NaiveDate;

/// Everything the dashboard shows, computed fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub username: String,
    pub summaries: Vec<HabitSummary>,
    pub goals: Vec<Goal>,
    /// Longest current streak across all habits.
    pub best_streak: u32,
    pub completed_goals: usize,
}

pub fn build_dashboard<H, P, G>(
    ctx: &RequestContext,
    habits: &HabitService<H, P>,
    goals: &GoalService<G>,
    today: NaiveDate,
) -> ServiceResult<Dashboard>
where
    H: HabitRepository,
    P: ProgressRepository,
    G: GoalRepository,
{
    let user = ctx.require_user()?;
    let summaries = habits.summaries(ctx, today)?;
    let goals = goals.list_goals(ctx)?;

    Ok(Dashboard {
        username: user.username.clone(),
        best_streak: summaries
            .iter()
            .map(|summary| summary.current_streak)
            .max()
            .unwrap_or(0),
        completed_goals: goals.iter().filter(|goal| goal.is_completed).count(),
        summaries,
        goals,
    })
}
