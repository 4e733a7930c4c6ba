//! SQLite storage backend implementation.
//!
//! Provides a SQLite-based implementation of `EntityStore` using `sqlx`.
//! Each poll is an entity group; transactions take the database write lock
//! when they begin and wait up to the configured busy timeout for it.

mod conversions;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
