//! Goal use-cases.
//!
//! `progress_percentage` is whatever the user entered; nothing here derives
//! it from other records.

use crate::model::goal::Goal;
use crate::model::GoalId;
use crate::repo::goal_repo::GoalRepository;
use crate::service::access::{ensure_owned, RequestContext, SessionUser};
use crate::service::ServiceResult;
use crate::validate::goal::GoalInput;
use log::info;

/// Goal service facade over a goal repository.
pub struct GoalService<G: GoalRepository> {
    goals: G,
}

impl<G: GoalRepository> GoalService<G> {
    pub fn new(goals: G) -> Self {
        Self { goals }
    }

    /// Lists the acting user's goals, latest target date first.
    pub fn list_goals(&self, ctx: &RequestContext) -> ServiceResult<Vec<Goal>> {
        let user = ctx.require_user()?;
        Ok(self.goals.find_by_owner(user.id)?)
    }

    pub fn create_goal(&self, ctx: &RequestContext, input: &GoalInput) -> ServiceResult<Goal> {
        let user = ctx.require_user()?;
        let draft = input.validate()?;
        let goal = self.goals.create_goal(user.id, &draft)?;
        info!(
            "event=goal_create module=goal status=ok user_id={} goal_id={}",
            user.id, goal.id
        );
        Ok(goal)
    }

    pub fn get_goal(&self, ctx: &RequestContext, id: GoalId) -> ServiceResult<Goal> {
        let user = ctx.require_user()?;
        self.owned_goal(user, id)
    }

    pub fn update_goal(
        &self,
        ctx: &RequestContext,
        id: GoalId,
        input: &GoalInput,
    ) -> ServiceResult<Goal> {
        let user = ctx.require_user()?;
        let goal = self.owned_goal(user, id)?;
        let draft = input.validate()?;
        let updated = self.goals.update_goal(goal.id, &draft)?;
        info!(
            "event=goal_update module=goal status=ok user_id={} goal_id={}",
            user.id, goal.id
        );
        Ok(updated)
    }

    pub fn delete_goal(&self, ctx: &RequestContext, id: GoalId) -> ServiceResult<()> {
        let user = ctx.require_user()?;
        let goal = self.owned_goal(user, id)?;
        self.goals.delete_goal(goal.id)?;
        info!(
            "event=goal_delete module=goal status=ok user_id={} goal_id={}",
            user.id, goal.id
        );
        Ok(())
    }

    fn owned_goal(&self, user: &SessionUser, id: GoalId) -> ServiceResult<Goal> {
        ensure_owned(user, self.goals.find_by_id(id)?)
    }
}
