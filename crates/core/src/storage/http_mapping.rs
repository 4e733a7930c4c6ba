//! Pure functions for mapping domain and repository errors to HTTP status codes.

use super::RepositoryError;
use crate::poll::PollError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `InvalidArgument` -> 400 (Bad Request)
/// - `StoreUnavailable` -> 500 (Internal Server Error)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use polly_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Poll",
///     id: "42".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::InvalidArgument(_) => 400,
        RepositoryError::StoreUnavailable(_) => 500,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 500,
    }
}

/// Maps a [`PollError`] to an HTTP status code. Every variant is a bad request.
pub fn poll_error_to_status_code(error: &PollError) -> u16 {
    match error {
        PollError::EmptyTitle
        | PollError::TooFewOptions { .. }
        | PollError::TooManyOptions { .. }
        | PollError::TextTooLong { .. }
        | PollError::MalformedId { .. } => 400,
    }
}
