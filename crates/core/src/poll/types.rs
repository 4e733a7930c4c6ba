use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::PollError;

/// Store-assigned identity of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub i64);

/// Identity of an option, scoped under its poll (1..N in submission order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub i64);

/// Opaque, stable identity of an authenticated user.
///
/// Supplied by whatever sits in front of the application; polly never
/// interprets it beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a positive decimal id. Signs, whitespace and zero are rejected.
fn parse_positive_id(kind: &'static str, value: &str) -> Result<i64, PollError> {
    let malformed = || PollError::MalformedId {
        kind,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(malformed()),
    }
}

impl FromStr for PollId {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id("poll", s).map(PollId)
    }
}

impl FromStr for OptionId {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive_id("option", s).map(OptionId)
    }
}

/// A poll and its running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub name: String,
    pub owner: UserId,
    pub option_count: i64,
    /// Number of distinct voters currently holding a vote on this poll.
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// Creates a poll with no votes yet.
    pub fn new(id: PollId, name: impl Into<String>, owner: UserId, option_count: i64) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            option_count,
            total_votes: 0,
            created_at: Utc::now(),
        }
    }

    /// Sets a specific creation time (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Direct option ids for this poll, in submission order.
    pub fn option_ids(&self) -> impl Iterator<Item = OptionId> {
        (1..=self.option_count).map(OptionId)
    }
}

/// One choice within a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub poll_id: PollId,
    pub id: OptionId,
    pub text: String,
    /// Image reference (usually a URL). Polly does not store images itself.
    pub image: Option<String>,
    pub votes: i64,
}

impl PollOption {
    pub fn new(poll_id: PollId, id: OptionId, text: impl Into<String>) -> Self {
        Self {
            poll_id,
            id,
            text: text.into(),
            image: None,
            votes: 0,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A voter's current choice on one poll. At most one exists per (poll, voter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub poll_id: PollId,
    pub voter: UserId,
    /// `None` is equivalent to having no vote at all.
    pub option_id: Option<OptionId>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(poll_id: PollId, voter: UserId, option_id: OptionId) -> Self {
        Self {
            poll_id,
            voter,
            option_id: Some(option_id),
            updated_at: Utc::now(),
        }
    }
}
