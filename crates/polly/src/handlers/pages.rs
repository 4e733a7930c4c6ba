use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use polly_core::poll::{OptionId, Poll, PollId, PollOption, MAX_OPTIONS};

use crate::{context::RequestContext, handlers::AppError, state::AppState};

/// Template wrapper that converts Askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {err}"),
            )
                .into_response(),
        }
    }
}

// ============================================================================
// View models
// ============================================================================

struct PollSummary {
    id: i64,
    name: String,
    total_votes: i64,
    created_at: String,
}

impl From<Poll> for PollSummary {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id.0,
            name: poll.name,
            total_votes: poll.total_votes,
            created_at: poll.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

struct OptionView {
    id: i64,
    text: String,
    image: String,
    has_image: bool,
    votes: i64,
    selected: bool,
}

impl OptionView {
    fn new(option: PollOption, current: Option<OptionId>) -> Self {
        Self {
            id: option.id.0,
            selected: current == Some(option.id),
            has_image: option.image.is_some(),
            image: option.image.unwrap_or_default(),
            text: option.text,
            votes: option.votes,
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

/// The caller's own polls.
#[derive(Template)]
#[template(path = "list.html")]
struct ListTemplate {
    owner: String,
    polls: Vec<PollSummary>,
}

/// Form for a new poll.
#[derive(Template)]
#[template(path = "new.html")]
struct NewPollTemplate {
    slots: Vec<usize>,
}

/// A single poll with its options.
#[derive(Template)]
#[template(path = "poll.html")]
struct PollTemplate {
    poll_id: i64,
    name: String,
    total_votes: i64,
    options: Vec<OptionView>,
    can_vote: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for the poll list (GET /).
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let owner = ctx.require_voter()?;
    let polls = state.polls.list_polls(owner).await?;

    Ok(HtmlTemplate(ListTemplate {
        owner: owner.to_string(),
        polls: polls.into_iter().map(PollSummary::from).collect(),
    }))
}

/// Handler for the new poll form (GET /new).
pub async fn new_poll() -> impl IntoResponse {
    HtmlTemplate(NewPollTemplate {
        slots: (1..=MAX_OPTIONS).collect(),
    })
}

/// Handler for a poll page (GET /poll/{id}).
///
/// Anonymous callers see the poll without a selection and cannot vote.
pub async fn show_poll(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let poll_id: PollId = id.parse()?;

    let poll = state.polls.get_poll(poll_id).await?;
    let options = state.polls.options_of(&poll).await?;

    let current = match &ctx.voter {
        Some(voter) => state
            .polls
            .get_vote(poll_id, voter)
            .await?
            .and_then(|vote| vote.option_id),
        None => None,
    };

    Ok(HtmlTemplate(PollTemplate {
        poll_id: poll.id.0,
        name: poll.name,
        total_votes: poll.total_votes,
        options: options
            .into_iter()
            .map(|option| OptionView::new(option, current))
            .collect(),
        can_vote: ctx.voter.is_some(),
    }))
}
