use thiserror::Error;

/// Errors raised while validating poll input. All of them are caller mistakes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Poll title cannot be empty")]
    EmptyTitle,
    #[error("A poll needs at least {min} options, got {given}")]
    TooFewOptions { min: usize, given: usize },
    #[error("A poll can have at most {max} options, got {given}")]
    TooManyOptions { max: usize, given: usize },
    #[error("{field} too long (max {max} characters)")]
    TextTooLong { field: &'static str, max: usize },
    #[error("Malformed {kind} id: {value}")]
    MalformedId { kind: &'static str, value: String },
}
