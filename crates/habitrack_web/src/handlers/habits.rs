//! Habit CRUD and progress recording.

use crate::error::WebResult;
use crate::handlers::{habit_service, parse_id, today};
use crate::render;
use crate::session::{redirect_with_flash, Flash, SessionContext};
use crate::state::AppState;
use axum::extract::{Form, Path, State};
use axum::response::Response;
use habitrack_core::validate::format_date;
use habitrack_core::{
    summarize, Frequency, Habit, HabitId, HabitInput, ProgressId, ProgressInput, ServiceError,
    ServiceResult, ValidationErrors,
};
use serde::Deserialize;

/// Desired status for one progress entry; an absent or falsy value means
/// not completed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: Option<String>,
}

fn input_from(habit: &Habit) -> HabitInput {
    HabitInput {
        title: habit.title.clone(),
        description: habit.description.clone(),
        frequency: habit.frequency.as_str().to_string(),
    }
}

fn progress_url(id: HabitId) -> String {
    format!("/habits/{id}/progress/")
}

pub async fn list(State(state): State<AppState>, session: SessionContext) -> WebResult<Response> {
    let summaries = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.summaries(&session.ctx, today())
    })??;
    Ok(session.page(render::habit_list(session.chrome(), &summaries)))
}

pub async fn add_page(session: SessionContext) -> WebResult<Response> {
    session.ctx.require_user()?;
    let blank = HabitInput {
        frequency: Frequency::Daily.as_str().to_string(),
        ..HabitInput::default()
    };
    let html = render::habit_form(session.chrome(), "Add habit", "/habits/add/", &blank, None);
    Ok(session.page(html))
}

pub async fn add(
    State(state): State<AppState>,
    session: SessionContext,
    Form(input): Form<HabitInput>,
) -> WebResult<Response> {
    let outcome = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.create_habit(&session.ctx, &input)
    })?;
    match outcome {
        Ok(_) => Ok(redirect_with_flash("/habits/", Flash::HabitCreated)),
        Err(ServiceError::Validation(errors)) => {
            let html = render::habit_form(
                session.chrome(),
                "Add habit",
                "/habits/add/",
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
    let id = HabitId(parse_id(&id)?);
    let habit = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.get_habit(&session.ctx, id)
    })??;
    let html = render::habit_form(
        session.chrome(),
        "Edit habit",
        &format!("/habits/{id}/edit/"),
        &input_from(&habit),
        None,
    );
    Ok(session.page(html))
}

pub async fn edit(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Form(input): Form<HabitInput>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    let outcome = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.update_habit(&session.ctx, id, &input)
    })?;
    match outcome {
        Ok(_) => Ok(redirect_with_flash("/habits/", Flash::HabitUpdated)),
        Err(ServiceError::Validation(errors)) => {
            let html = render::habit_form(
                session.chrome(),
                "Edit habit",
                &format!("/habits/{id}/edit/"),
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
    let id = HabitId(parse_id(&id)?);
    let habit = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.get_habit(&session.ctx, id)
    })??;
    let html = render::confirm_delete(
        session.chrome(),
        "Delete habit",
        &habit.title,
        &format!("/habits/{id}/delete/"),
        "/habits/",
    );
    Ok(session.page(html))
}

pub async fn delete(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.delete_habit(&session.ctx, id)
    })??;
    Ok(redirect_with_flash("/habits/", Flash::HabitDeleted))
}

pub async fn progress(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    let (habit, entries) = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.list_progress(&session.ctx, id)
    })??;
    let summary = summarize(habit, &entries, today());
    Ok(session.page(render::progress_list(session.chrome(), &summary, &entries)))
}

pub async fn progress_add_page(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    let habit = state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.get_habit(&session.ctx, id)
    })??;
    let prefilled = ProgressInput {
        date: format_date(today()),
        status: Some("on".to_string()),
    };
    Ok(session.page(render::progress_form(session.chrome(), &habit, &prefilled, None)))
}

pub async fn progress_add(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Form(input): Form<ProgressInput>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    let rejected = state.with_conn(|conn| -> ServiceResult<Option<(Habit, ValidationErrors)>> {
        let service = habit_service(conn)?;
        match service.record_progress(&session.ctx, id, &input) {
            Ok(_) => Ok(None),
            Err(ServiceError::Validation(errors)) => {
                Ok(Some((service.get_habit(&session.ctx, id)?, errors)))
            }
            Err(err) => Err(err),
        }
    })??;

    match rejected {
        None => Ok(redirect_with_flash(&progress_url(id), Flash::ProgressSaved)),
        Some((habit, errors)) => {
            let html = render::progress_form(session.chrome(), &habit, &input, Some(&errors));
            Ok(session.page(html))
        }
    }
}

/// Sets the completion status of one recorded entry.
pub async fn progress_status(
    State(state): State<AppState>,
    session: SessionContext,
    Path((id, entry_id)): Path<(String, String)>,
    Form(form): Form<StatusForm>,
) -> WebResult<Response> {
    let id = HabitId(parse_id(&id)?);
    let entry_id = ProgressId(parse_id(&entry_id)?);
    let status = habitrack_core::validate::checkbox(form.status.as_deref());
    state.with_conn(|conn| -> ServiceResult<_> {
        habit_service(conn)?.set_progress_status(&session.ctx, id, entry_id, status)
    })??;
    Ok(redirect_with_flash(&progress_url(id), Flash::ProgressSaved))
}
