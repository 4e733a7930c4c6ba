//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, SecondsFormat, Utc};

use polly_core::poll::{OptionId, Poll, PollId, PollOption, UserId, Vote};
use polly_core::storage::{RepositoryError, Result};

/// Columns: id, name, owner, option_count, total_votes, created_at
pub type PollRow = (i64, String, String, i64, i64, String);

/// Columns: poll_id, id, text, image, votes
pub type OptionRow = (i64, i64, String, Option<String>, i64);

/// Columns: poll_id, voter, option_id, updated_at
pub type VoteRow = (i64, String, Option<i64>, String);

// ============================================================================
// Row -> domain
// ============================================================================

pub fn row_to_poll(row: PollRow) -> Result<Poll> {
    let (id, name, owner, option_count, total_votes, created_at) = row;

    Ok(Poll {
        id: PollId(id),
        name,
        owner: UserId::new(owner),
        option_count,
        total_votes,
        created_at: parse_datetime(&created_at)?,
    })
}

pub fn row_to_option(row: OptionRow) -> PollOption {
    let (poll_id, id, text, image, votes) = row;

    PollOption {
        poll_id: PollId(poll_id),
        id: OptionId(id),
        text,
        image,
        votes,
    }
}

pub fn row_to_vote(row: VoteRow) -> Result<Vote> {
    let (poll_id, voter, option_id, updated_at) = row;

    Ok(Vote {
        poll_id: PollId(poll_id),
        voter: UserId::new(voter),
        option_id: option_id.map(OptionId),
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(format!("invalid timestamp {s:?}: {e}")))
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
