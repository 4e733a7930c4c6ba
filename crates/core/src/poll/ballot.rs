//! Vote state machine.
//!
//! Decides what a ballot does to a voter's standing on a poll, and applies
//! the resulting counter changes to the loaded records. The transactional
//! shell loads the records, calls into here, and writes back whatever changed.

use serde::{Deserialize, Serialize};

use super::types::{OptionId, Poll, PollId, PollOption, UserId, Vote};

/// A request to put `voter`'s vote on `option_id` of `poll_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub poll_id: PollId,
    pub option_id: OptionId,
    pub voter: UserId,
}

/// Where a voter currently stands on a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotState {
    Unvoted,
    VotedFor(OptionId),
}

impl BallotState {
    /// A missing record and a record without an option both mean "not voted".
    pub fn from_vote(vote: Option<&Vote>) -> Self {
        match vote.and_then(|v| v.option_id) {
            Some(option_id) => BallotState::VotedFor(option_id),
            None => BallotState::Unvoted,
        }
    }
}

/// What casting a ballot changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// Already voting for this option; nothing to write.
    Unchanged,
    /// First vote on this poll: the poll total and the target both go up.
    FirstVote,
    /// Moving from another option: `from` goes down, the target goes up.
    Switch { from: OptionId },
}

/// Computes the transition for casting a ballot on `target` from `state`.
pub fn transition(state: BallotState, target: OptionId) -> VoteTransition {
    match state {
        BallotState::VotedFor(current) if current == target => VoteTransition::Unchanged,
        BallotState::VotedFor(current) => VoteTransition::Switch { from: current },
        BallotState::Unvoted => VoteTransition::FirstVote,
    }
}

/// Result reported to callers once a ballot has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoteOutcome {
    Unchanged,
    Counted,
    Moved { from: OptionId },
}

impl From<VoteTransition> for VoteOutcome {
    fn from(transition: VoteTransition) -> Self {
        match transition {
            VoteTransition::Unchanged => VoteOutcome::Unchanged,
            VoteTransition::FirstVote => VoteOutcome::Counted,
            VoteTransition::Switch { from } => VoteOutcome::Moved { from },
        }
    }
}

/// Counter underflow: an option claimed to hold a vote it does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUnderflow {
    pub poll_id: PollId,
    pub option_id: OptionId,
}

impl PollOption {
    pub fn credit(&mut self) {
        self.votes += 1;
    }

    pub fn debit(&mut self) -> Result<(), CountUnderflow> {
        if self.votes <= 0 {
            return Err(CountUnderflow {
                poll_id: self.poll_id,
                option_id: self.id,
            });
        }
        self.votes -= 1;
        Ok(())
    }
}

impl Poll {
    /// Records a voter casting their first vote on this poll.
    pub fn count_new_voter(&mut self) {
        self.total_votes += 1;
    }
}

impl Vote {
    /// Points this vote at `option_id` and stamps the change.
    pub fn point_at(&mut self, option_id: OptionId) {
        self.option_id = Some(option_id);
        self.updated_at = chrono::Utc::now();
    }
}
