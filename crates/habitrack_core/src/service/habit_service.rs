//! Habit and habit progress use-cases.
//!
//! # Invariants
//! - Every call requires an authenticated context.
//! - Id-scoped calls authorize against the loaded habit before any further
//!   read or write.

use crate::model::habit::{Habit, HabitProgress};
use crate::model::{HabitId, ProgressId};
use crate::repo::habit_repo::HabitRepository;
use crate::repo::progress_repo::ProgressRepository;
use crate::service::access::{ensure_owned, ProgressResource, RequestContext, SessionUser};
use crate::service::progress::{summarize, summarize_all, HabitSummary};
use crate::service::{ServiceError, ServiceResult};
use crate::validate::habit::HabitInput;
use crate::validate::progress::ProgressInput;
use chrono::NaiveDate;
use log::info;

/// Habit service facade over habit and progress repositories.
pub struct HabitService<H: HabitRepository, P: ProgressRepository> {
    habits: H,
    progress: P,
}

impl<H: HabitRepository, P: ProgressRepository> HabitService<H, P> {
    pub fn new(habits: H, progress: P) -> Self {
        Self { habits, progress }
    }

    /// Lists the acting user's habits, newest first.
    pub fn list_habits(&self, ctx: &RequestContext) -> ServiceResult<Vec<Habit>> {
        let user = ctx.require_user()?;
        Ok(self.habits.find_by_owner(user.id)?)
    }

    pub fn create_habit(&self, ctx: &RequestContext, input: &HabitInput) -> ServiceResult<Habit> {
        let user = ctx.require_user()?;
        let draft = input.validate()?;
        let habit = self.habits.create_habit(user.id, &draft)?;
        info!(
            "event=habit_create module=habit status=ok user_id={} habit_id={}",
            user.id, habit.id
        );
        Ok(habit)
    }

    /// Loads one owned habit.
    pub fn get_habit(&self, ctx: &RequestContext, id: HabitId) -> ServiceResult<Habit> {
        let user = ctx.require_user()?;
        self.owned_habit(user, id)
    }

    pub fn update_habit(
        &self,
        ctx: &RequestContext,
        id: HabitId,
        input: &HabitInput,
    ) -> ServiceResult<Habit> {
        let user = ctx.require_user()?;
        let habit = self.owned_habit(user, id)?;
        let draft = input.validate()?;
        let updated = self.habits.update_habit(habit.id, &draft)?;
        info!(
            "event=habit_update module=habit status=ok user_id={} habit_id={}",
            user.id, habit.id
        );
        Ok(updated)
    }

    /// Deletes an owned habit and its progress entries; returns how many
    /// entries went with it.
    pub fn delete_habit(&self, ctx: &RequestContext, id: HabitId) -> ServiceResult<usize> {
        let user = ctx.require_user()?;
        let habit = self.owned_habit(user, id)?;
        let removed = self.habits.delete_cascade(habit.id)?;
        info!(
            "event=habit_delete module=habit status=ok user_id={} habit_id={} progress_entries={}",
            user.id, habit.id, removed
        );
        Ok(removed)
    }

    /// Loads an owned habit with its entries, most recent date first.
    pub fn list_progress(
        &self,
        ctx: &RequestContext,
        id: HabitId,
    ) -> ServiceResult<(Habit, Vec<HabitProgress>)> {
        let user = ctx.require_user()?;
        let habit = self.owned_habit(user, id)?;
        let entries = self.progress.list_for_habit(habit.id)?;
        Ok((habit, entries))
    }

    /// Records one dated entry for an owned habit.
    ///
    /// # Errors
    /// - `Validation` on the `date` field when that date is already recorded.
    pub fn record_progress(
        &self,
        ctx: &RequestContext,
        id: HabitId,
        input: &ProgressInput,
    ) -> ServiceResult<HabitProgress> {
        let user = ctx.require_user()?;
        let habit = self.owned_habit(user, id)?;
        let draft = input.validate()?;
        let entry = self.progress.record_progress(habit.id, &draft)?;
        info!(
            "event=progress_record module=habit status=ok user_id={} habit_id={} progress_id={}",
            user.id, habit.id, entry.id
        );
        Ok(entry)
    }

    /// Overwrites the completion status of one owned entry.
    pub fn set_progress_status(
        &self,
        ctx: &RequestContext,
        habit_id: HabitId,
        entry_id: ProgressId,
        status: bool,
    ) -> ServiceResult<HabitProgress> {
        let user = ctx.require_user()?;
        let habit = self.owned_habit(user, habit_id)?;
        let entry = self
            .progress
            .find_by_id(entry_id)?
            .ok_or(ServiceError::NotFound)?;
        ensure_owned(
            user,
            Some(ProgressResource {
                habit: &habit,
                entry: &entry,
            }),
        )?;
        Ok(self.progress.set_status(entry.id, status)?)
    }

    /// Completion statistics for every habit of the acting user.
    pub fn summaries(
        &self,
        ctx: &RequestContext,
        today: NaiveDate,
    ) -> ServiceResult<Vec<HabitSummary>> {
        let user = ctx.require_user()?;
        let habits = self.habits.find_by_owner(user.id)?;
        let entries = self.progress.list_for_owner(user.id)?;
        Ok(summarize_all(habits, &entries, today))
    }

    /// Completion statistics for one owned habit.
    pub fn summary(
        &self,
        ctx: &RequestContext,
        id: HabitId,
        today: NaiveDate,
    ) -> ServiceResult<HabitSummary> {
        let (habit, entries) = self.list_progress(ctx, id)?;
        Ok(summarize(habit, &entries, today))
    }

    fn owned_habit(&self, user: &SessionUser, id: HabitId) -> ServiceResult<Habit> {
        ensure_owned(user, self.habits.find_by_id(id)?)
    }
}
