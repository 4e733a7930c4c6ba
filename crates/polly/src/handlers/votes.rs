//! Vote casting.

use axum::extract::{Path, State};

use polly_core::poll::{Ballot, OptionId, PollId};

use crate::{context::RequestContext, handlers::AppError, state::AppState, voting};

/// Cast or change the caller's vote (POST /vote/{poll_id}/{option_id}).
///
/// Answers `OK` whether the vote was counted, moved, or already in place.
pub async fn cast_vote(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((poll_id, option_id)): Path<(String, String)>,
) -> Result<&'static str, AppError> {
    let poll_id: PollId = poll_id.parse()?;
    let option_id: OptionId = option_id.parse()?;
    let voter = ctx.require_voter()?.clone();

    let outcome = voting::cast_vote(
        state.store.as_ref(),
        Ballot {
            poll_id,
            option_id,
            voter: voter.clone(),
        },
    )
    .await?;

    tracing::info!(
        request_id = %ctx.request_id,
        poll_id = %poll_id,
        option_id = %option_id,
        voter = %voter,
        outcome = ?outcome,
        "Vote cast"
    );

    Ok("OK")
}
