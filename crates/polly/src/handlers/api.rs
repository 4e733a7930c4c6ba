//! JSON endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use polly_core::poll::{Poll, PollId, PollOption};

use crate::{handlers::AppError, state::AppState};

/// A poll with its options and running totals.
#[derive(Debug, Serialize)]
pub struct PollDetail {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

/// Get a poll and its options (GET /api/polls/{id}).
pub async fn get_poll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PollDetail>, AppError> {
    let poll_id: PollId = id.parse()?;

    let poll = state.polls.get_poll(poll_id).await?;
    let options = state.polls.options_of(&poll).await?;

    Ok(Json(PollDetail { poll, options }))
}
