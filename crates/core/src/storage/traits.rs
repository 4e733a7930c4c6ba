use async_trait::async_trait;

use crate::poll::PollId;

use super::{Entity, EntityKey, EntityQuery, Result};

/// Keyed storage for polls, options and votes.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Gets a record by key.
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>>;

    /// Gets several records at once. The result lines up with `keys`.
    async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Entity>>>;

    /// Inserts or replaces several records in one all-or-nothing batch.
    async fn put_multi(&self, entities: &[Entity]) -> Result<()>;

    /// Inserts or replaces a single record.
    async fn put(&self, entity: &Entity) -> Result<()> {
        self.put_multi(std::slice::from_ref(entity)).await
    }

    /// Runs a filtered scan.
    async fn query(&self, query: &EntityQuery) -> Result<Vec<Entity>>;

    /// Reserves a fresh poll id.
    async fn allocate_poll_id(&self) -> Result<PollId>;

    /// Opens a transaction over one entity group.
    ///
    /// Transactions on the same group are serialized; the returned value rolls
    /// back if dropped without [`StoreTransaction::commit`].
    async fn begin(&self, group: PollId) -> Result<Box<dyn StoreTransaction>>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<()>;
}

/// Reads and writes available inside a transaction.
///
/// Reads see the transaction's own staged writes. Keys outside the
/// transaction's group are rejected.
#[async_trait]
pub trait TransactionScope: Send {
    async fn get(&mut self, key: &EntityKey) -> Result<Option<Entity>>;

    async fn put(&mut self, entity: Entity) -> Result<()>;
}

/// An open transaction, as handed out by [`EntityStore::begin`].
#[async_trait]
pub trait StoreTransaction: TransactionScope {
    /// Borrows the transaction as the scope passed to transaction bodies.
    fn scope(&mut self) -> &mut dyn TransactionScope;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
