use thiserror::Error;

use crate::poll::{CountUnderflow, PollError};

/// Errors that can occur during entity store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<PollError> for RepositoryError {
    fn from(err: PollError) -> Self {
        RepositoryError::InvalidArgument(err.to_string())
    }
}

impl From<CountUnderflow> for RepositoryError {
    fn from(err: CountUnderflow) -> Self {
        RepositoryError::InvalidData(format!(
            "vote count underflow on option {} of poll {}",
            err.option_id, err.poll_id
        ))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
