//! Poll creation.

use axum::{extract::State, response::Redirect, Form};

use polly_core::poll::NewPoll;

use crate::{context::RequestContext, handlers::AppError, state::AppState};

/// Create a poll from the submitted form (POST /add).
///
/// Fields: `title`, then `title1..N` for option texts and `img1..N` for
/// optional image references. Redirects to the new poll's page.
pub async fn create_poll(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let owner = ctx.require_voter()?.clone();
    let new_poll = NewPoll::from_form(owner, &fields)?;

    let poll_id = state.polls.create_poll(new_poll).await?;

    tracing::info!(request_id = %ctx.request_id, poll_id = %poll_id, "Poll submitted");

    Ok(Redirect::to(&format!("/poll/{poll_id}")))
}
