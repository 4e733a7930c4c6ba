//! Transaction runner.
//!
//! The body receives the transactional scope as an explicit argument and
//! must do all of its reads and writes through it.

use futures_util::future::BoxFuture;

use crate::poll::PollId;

use super::{EntityStore, Result, TransactionScope};

/// Runs `body` inside a transaction on `group`.
///
/// Commits when the body succeeds and rolls back when it fails, returning the
/// body's error. Nothing is retried.
///
/// ```ignore
/// let total = run_in_transaction(store, poll_id, move |tx| {
///     Box::pin(async move {
///         let poll = tx.get(&EntityKey::Poll(poll_id)).await?;
///         Ok(poll.is_some())
///     })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<T, F>(store: &dyn EntityStore, group: PollId, body: F) -> Result<T>
where
    T: Send,
    F: for<'tx> FnOnce(&'tx mut dyn TransactionScope) -> BoxFuture<'tx, Result<T>> + Send,
{
    let mut tx = store.begin(group).await?;

    match body(tx.scope()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            // A failed rollback still leaves nothing committed.
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(group = %group, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::storage::{Entity, EntityKey, EntityQuery, RepositoryError, StoreTransaction};

    /// Store whose transactions count commits and always fail to roll back.
    #[derive(Default)]
    struct FlakyStore {
        commits: Arc<AtomicUsize>,
        rollbacks: Arc<AtomicUsize>,
    }

    struct FlakyTransaction {
        commits: Arc<AtomicUsize>,
        rollbacks: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EntityStore for FlakyStore {
        async fn get(&self, _key: &EntityKey) -> Result<Option<Entity>> {
            Ok(None)
        }

        async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Entity>>> {
            Ok(vec![None; keys.len()])
        }

        async fn put_multi(&self, _entities: &[Entity]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _query: &EntityQuery) -> Result<Vec<Entity>> {
            Ok(Vec::new())
        }

        async fn allocate_poll_id(&self) -> Result<PollId> {
            Ok(PollId(1))
        }

        async fn begin(&self, _group: PollId) -> Result<Box<dyn StoreTransaction>> {
            Ok(Box::new(FlakyTransaction {
                commits: self.commits.clone(),
                rollbacks: self.rollbacks.clone(),
            }))
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionScope for FlakyTransaction {
        async fn get(&mut self, _key: &EntityKey) -> Result<Option<Entity>> {
            Ok(None)
        }

        async fn put(&mut self, _entity: Entity) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl StoreTransaction for FlakyTransaction {
        fn scope(&mut self) -> &mut dyn TransactionScope {
            self
        }

        async fn commit(self: Box<Self>) -> Result<()> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            self.rollbacks.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::StoreUnavailable("rollback failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_success_commits_and_returns_value() {
        let store = FlakyStore::default();

        let value = run_in_transaction(&store, PollId(1), |_tx| Box::pin(async move { Ok(7) }))
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(store.commits.load(Ordering::SeqCst), 1);
        assert_eq!(store.rollbacks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_rollback_returns_body_error() {
        let store = FlakyStore::default();

        let result: Result<()> = run_in_transaction(&store, PollId(1), |_tx| {
            Box::pin(async move { Err(RepositoryError::InvalidArgument("bad".to_string())) })
        })
        .await;

        assert_eq!(
            result,
            Err(RepositoryError::InvalidArgument("bad".to_string()))
        );
        assert_eq!(store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(store.rollbacks.load(Ordering::SeqCst), 1);
    }
}
