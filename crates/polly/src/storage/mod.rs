//! Storage backend implementations.
//!
//! This module provides concrete implementations of the `EntityStore` trait
//! defined in `polly_core::storage`. The in-memory backend is always
//! available; the SQLite backend is selected at compile time.
//!
//! # Feature Flags
//!
//! - (default): in-memory storage, data is lost on restart
//! - `sqlite`: SQLite storage backend using `sqlx`
//!
//! # Examples
//!
//! Build with the in-memory store:
//! ```bash
//! cargo build -p polly
//! ```
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p polly --features sqlite
//! ```

pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
