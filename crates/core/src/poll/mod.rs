mod ballot;
mod error;
mod requests;
mod types;

pub use ballot::{transition, Ballot, BallotState, CountUnderflow, VoteOutcome, VoteTransition};
pub use error::PollError;
pub use requests::{validate_new_poll, NewOption, NewPoll, MAX_OPTIONS, MAX_TEXT_LEN, MIN_OPTIONS};
pub use types::{OptionId, Poll, PollId, PollOption, UserId, Vote};
