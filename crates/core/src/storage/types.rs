use std::fmt;

use serde::{Deserialize, Serialize};

use crate::poll::{OptionId, Poll, PollId, PollOption, UserId, Vote};

use super::{RepositoryError, Result};

/// Key of a stored record.
///
/// Every key lives in exactly one entity group, the poll it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    Poll(PollId),
    Option(PollId, OptionId),
    Vote(PollId, UserId),
}

impl EntityKey {
    /// The entity group (poll) this key belongs to.
    pub fn group(&self) -> PollId {
        match self {
            EntityKey::Poll(poll_id)
            | EntityKey::Option(poll_id, _)
            | EntityKey::Vote(poll_id, _) => *poll_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntityKey::Poll(_) => "Poll",
            EntityKey::Option(..) => "Option",
            EntityKey::Vote(..) => "Vote",
        }
    }

    /// A NotFound error naming this key.
    pub fn not_found(&self) -> RepositoryError {
        RepositoryError::not_found(self.kind(), self)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Poll(poll_id) => write!(f, "{poll_id}"),
            EntityKey::Option(poll_id, option_id) => write!(f, "{poll_id}/{option_id}"),
            EntityKey::Vote(poll_id, voter) => write!(f, "{poll_id}/{voter}"),
        }
    }
}

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Poll(Poll),
    Option(PollOption),
    Vote(Vote),
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        match self {
            Entity::Poll(poll) => EntityKey::Poll(poll.id),
            Entity::Option(option) => EntityKey::Option(option.poll_id, option.id),
            Entity::Vote(vote) => EntityKey::Vote(vote.poll_id, vote.voter.clone()),
        }
    }

    pub fn into_poll(self) -> Result<Poll> {
        match self {
            Entity::Poll(poll) => Ok(poll),
            other => Err(kind_mismatch("Poll", &other)),
        }
    }

    pub fn into_option(self) -> Result<PollOption> {
        match self {
            Entity::Option(option) => Ok(option),
            other => Err(kind_mismatch("Option", &other)),
        }
    }

    pub fn into_vote(self) -> Result<Vote> {
        match self {
            Entity::Vote(vote) => Ok(vote),
            other => Err(kind_mismatch("Vote", &other)),
        }
    }
}

fn kind_mismatch(expected: &str, found: &Entity) -> RepositoryError {
    let key = found.key();
    RepositoryError::InvalidData(format!(
        "expected {expected}, found {} at {key}",
        key.kind()
    ))
}

impl From<Poll> for Entity {
    fn from(poll: Poll) -> Self {
        Entity::Poll(poll)
    }
}

impl From<PollOption> for Entity {
    fn from(option: PollOption) -> Self {
        Entity::Option(option)
    }
}

impl From<Vote> for Entity {
    fn from(vote: Vote) -> Self {
        Entity::Vote(vote)
    }
}

/// Filtered scans supported by every store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityQuery {
    /// Polls owned by a user, newest first.
    PollsByOwner(UserId),
}

/// Fails unless `key` belongs to the transaction's entity group.
pub fn ensure_in_group(group: PollId, key: &EntityKey) -> Result<()> {
    if key.group() == group {
        Ok(())
    } else {
        Err(RepositoryError::InvalidData(format!(
            "{} {key} is outside transaction group {group}",
            key.kind()
        )))
    }
}
