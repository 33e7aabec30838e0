//! Dashboard page: habit summaries, goals and streaks for the signed-in user.

use crate::error::WebResult;
use crate::handlers::{goal_service, habit_service, today};
use crate::render;
use crate::session::SessionContext;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Response;
use habitrack_core::{build_dashboard, ServiceResult};

pub async fn dashboard(
    State(state): State<AppState>,
    session: SessionContext,
) -> WebResult<Response> {
    render_dashboard(&state, &session)
}

pub(crate) fn render_dashboard(state: &AppState, session: &SessionContext) -> WebResult<Response> {
    let today = today();
    let dashboard = state.with_conn(|conn| -> ServiceResult<_> {
        build_dashboard(
            &session.ctx,
            &habit_service(conn)?,
            &goal_service(conn)?,
            today,
        )
    })??;
    Ok(session.page(render::dashboard(session.chrome(), &dashboard, today)))
}
