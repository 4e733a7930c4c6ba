//! SQLite error mapping.
//!
//! Maps `sqlx::Error` to `RepositoryError` from `polly_core::storage`.
//! Lock contention and pool exhaustion become `StoreUnavailable`.

use polly_core::storage::RepositoryError;
use sqlx::error::DatabaseError;

/// SQLITE_BUSY, SQLITE_LOCKED, SQLITE_LOCKED_SHAREDCACHE, SQLITE_BUSY_SNAPSHOT
const CONTENTION_CODES: [&str; 4] = ["5", "6", "262", "517"];

fn is_contention(err: &dyn DatabaseError) -> bool {
    let code_matches = err
        .code()
        .is_some_and(|code| CONTENTION_CODES.contains(&&*code));
    code_matches || err.message().contains("database is locked")
}

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - `RowNotFound` → `RepositoryError::NotFound`
/// - Pool timeouts, closed pools, I/O and lock contention → `RepositoryError::StoreUnavailable`
/// - UNIQUE / PRIMARY KEY violations → `RepositoryError::AlreadyExists`
/// - Decode errors → `RepositoryError::Serialization`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str) -> RepositoryError {
    map_sqlx_error_with_id(err, entity_type, "unknown")
}

/// Maps a sqlx error with a known ID to a RepositoryError.
pub fn map_sqlx_error_with_id(
    err: sqlx::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound {
            entity_type,
            id: id.into(),
        },

        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::StoreUnavailable(err.to_string())
        }

        sqlx::Error::Database(db_err) if is_contention(db_err.as_ref()) => {
            RepositoryError::StoreUnavailable(err.to_string())
        }

        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.into(),
            }
        }

        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_) => RepositoryError::Serialization(err.to_string()),

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
