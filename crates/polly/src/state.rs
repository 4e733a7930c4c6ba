//! Application state.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Storage sits behind an `EntityStore` trait object; the
//! concrete backend is chosen via feature flags.

use std::sync::Arc;

use polly_core::storage::EntityStore;

use crate::config::Config;
use crate::repository::PollRepository;
use crate::storage::InMemoryStore;

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Entity store, used directly by the vote engine and readiness checks.
    pub store: Arc<dyn EntityStore>,
    /// Poll repository over the same store.
    pub polls: PollRepository,
    /// Lower-cased name of the header carrying the caller identity.
    pub identity_header: Arc<str>,
}

impl AppState {
    /// Creates a new AppState over the given store.
    pub fn build(store: Arc<dyn EntityStore>, config: &Config) -> Self {
        Self {
            polls: PollRepository::new(store.clone()),
            store,
            identity_header: Arc::from(config.identity_header.as_str()),
        }
    }

    /// Creates AppState with a fresh in-memory store.
    #[cfg_attr(feature = "sqlite", allow(dead_code))]
    pub fn in_memory(config: &Config) -> Self {
        Self::build(Arc::new(InMemoryStore::new()), config)
    }
}

// ============================================================================
// Factory functions for the configured backend
// ============================================================================

#[cfg(feature = "sqlite")]
mod sqlite_backend {
    use super::*;
    use crate::storage::SqliteStore;

    impl AppState {
        /// Creates AppState with SQLite storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store =
                SqliteStore::new(&config.sqlite_path, config.sqlite_busy_timeout()).await?;

            tracing::info!(path = %config.sqlite_path, "Opened SQLite store");
            Ok(Self::build(Arc::new(store), config))
        }
    }
}

#[cfg(not(feature = "sqlite"))]
mod inmemory_backend {
    use super::*;

    impl AppState {
        /// Creates AppState with in-memory storage.
        /// Data does not survive a restart.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            tracing::warn!("Using in-memory store; data will be lost on shutdown");
            Ok(Self::in_memory(config))
        }
    }
}
