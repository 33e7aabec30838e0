//! Goal CRUD.

use crate::error::WebResult;
use crate::handlers::{goal_service, parse_id, today};
use crate::render;
use crate::session::{redirect_with_flash, Flash, SessionContext};
use crate::state::AppState;
use axum::extract::{Form, Path, State};
use axum::response::Response;
use habitrack_core::validate::format_date;
use habitrack_core::{Goal, GoalId, GoalInput, ServiceError, ServiceResult};

fn input_from(goal: &Goal) -> GoalInput {
    GoalInput {
        title: goal.title.clone(),
        description: goal.description.clone(),
        target_date: format_date(goal.target_date),
        is_completed: goal.is_completed.then(|| "on".to_string()),
        progress_percentage: goal.progress_percentage.to_string(),
        progress_notes: goal.progress_notes.clone(),
    }
}

pub async fn list(State(state): State<AppState>, session: SessionContext) -> WebResult<Response> {
    let goals = state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.list_goals(&session.ctx)
    })??;
    Ok(session.page(render::goal_list(session.chrome(), &goals, today())))
}

pub async fn add_page(session: SessionContext) -> WebResult<Response> {
    session.ctx.require_user()?;
    let blank = GoalInput {
        progress_percentage: "0".to_string(),
        ..GoalInput::default()
    };
    let html = render::goal_form(session.chrome(), "Add goal", "/goals/add/", &blank, None);
    Ok(session.page(html))
}

pub async fn add(
    State(state): State<AppState>,
    session: SessionContext,
    Form(input): Form<GoalInput>,
) -> WebResult<Response> {
    let outcome = state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.create_goal(&session.ctx, &input)
    })?;
    match outcome {
        Ok(_) => Ok(redirect_with_flash("/goals/", Flash::GoalCreated)),
        Err(ServiceError::Validation(errors)) => {
            let html = render::goal_form(
                session.chrome(),
                "Add goal",
                "/goals/add/",
                &input,
                Some(&errors),
            );
            Ok(session.page(html))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_page(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = GoalId(parse_id(&id)?);
    let goal = state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.get_goal(&session.ctx, id)
    })??;
    let html = render::goal_form(
        session.chrome(),
        "Edit goal",
        &format!("/goals/{id}/edit/"),
        &input_from(&goal),
        None,
    );
    Ok(session.page(html))
}

pub async fn edit(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Form(input): Form<GoalInput>,
) -> WebResult<Response> {
    let id = GoalId(parse_id(&id)?);
    let outcome = state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.update_goal(&session.ctx, id, &input)
    })?;
    match outcome {
        Ok(_) => Ok(redirect_with_flash("/goals/", Flash::GoalUpdated)),
        Err(ServiceError::Validation(errors)) => {
            let html = render::goal_form(
                session.chrome(),
                "Edit goal",
                &format!("/goals/{id}/edit/"),
                &input,
                Some(&errors),
            );
            Ok(session.page(html))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = GoalId(parse_id(&id)?);
    let goal = state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.get_goal(&session.ctx, id)
    })??;
    let html = render::confirm_delete(
        session.chrome(),
        "Delete goal",
        &goal.title,
        &format!("/goals/{id}/delete/"),
        "/goals/",
    );
    Ok(session.page(html))
}

pub async fn delete(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = GoalId(parse_id(&id)?);
    state.with_conn(|conn| -> ServiceResult<_> {
        goal_service(conn)?.delete_goal(&session.ctx, id)
    })??;
    Ok(redirect_with_flash("/goals/", Flash::GoalDeleted))
}
