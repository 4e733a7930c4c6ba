//! In-memory storage backend.
//!
//! Stores every record in a single ordered map and serializes transactions
//! per entity group. Used by the test suite and by the default build.
//!
//! # Example
//!
//! ```rust,ignore
//! use polly::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! // Use store for testing...
//! ```

mod store;

pub use store::InMemoryStore;
