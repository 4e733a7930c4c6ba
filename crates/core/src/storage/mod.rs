mod error;
mod http_mapping;
mod traits;
mod transaction;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::{poll_error_to_status_code, repository_error_to_status_code};
pub use traits::{EntityStore, StoreTransaction, TransactionScope};
pub use transaction::run_in_transaction;
pub use types::{ensure_in_group, Entity, EntityKey, EntityQuery};
