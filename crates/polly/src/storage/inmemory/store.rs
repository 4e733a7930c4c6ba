//! In-memory entity store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use polly_core::poll::PollId;
use polly_core::storage::{
    ensure_in_group, Entity, EntityKey, EntityQuery, EntityStore, Result, StoreTransaction,
    TransactionScope,
};

type Records = Arc<RwLock<BTreeMap<EntityKey, Entity>>>;

/// In-memory storage backend.
///
/// Records live in a `BTreeMap` behind an `Arc<RwLock<_>>`. Each entity group
/// has its own async mutex, held by a transaction from `begin` until it ends,
/// so transactions on the same poll run one at a time while different polls
/// proceed in parallel. Data is lost when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    records: Records,
    groups: Arc<Mutex<HashMap<PollId, Arc<Mutex<()>>>>>,
    next_poll_id: Arc<AtomicI64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            groups: Arc::new(Mutex::new(HashMap::new())),
            next_poll_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Returns the lock for `group`, dropping locks nobody holds or awaits.
    async fn group_lock(&self, group: PollId) -> Arc<Mutex<()>> {
        let mut groups = self.groups.lock().await;
        groups.retain(|_, lock| Arc::strong_count(lock) > 1);
        groups.entry(group).or_default().clone()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Entity>>> {
        let records = self.records.read().await;
        Ok(keys.iter().map(|key| records.get(key).cloned()).collect())
    }

    async fn put_multi(&self, entities: &[Entity]) -> Result<()> {
        let mut records = self.records.write().await;
        for entity in entities {
            records.insert(entity.key(), entity.clone());
        }
        Ok(())
    }

    async fn query(&self, query: &EntityQuery) -> Result<Vec<Entity>> {
        let records = self.records.read().await;

        let results = match query {
            EntityQuery::PollsByOwner(owner) => {
                let mut polls: Vec<Entity> = records
                    .values()
                    .filter(|e| matches!(e, Entity::Poll(poll) if &poll.owner == owner))
                    .cloned()
                    .collect();
                polls.sort_by(|a, b| match (a, b) {
                    (Entity::Poll(a), Entity::Poll(b)) => b
                        .created_at
                        .cmp(&a.created_at)
                        .then_with(|| b.id.cmp(&a.id)),
                    _ => std::cmp::Ordering::Equal,
                });
                polls
            }
        };

        Ok(results)
    }

    async fn allocate_poll_id(&self) -> Result<PollId> {
        Ok(PollId(self.next_poll_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn begin(&self, group: PollId) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.group_lock(group).await.lock_owned().await;

        Ok(Box::new(InMemoryTransaction {
            group,
            records: self.records.clone(),
            staged: BTreeMap::new(),
            _guard: guard,
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Transaction over one entity group.
///
/// Writes are staged locally and only reach the shared map on commit.
struct InMemoryTransaction {
    group: PollId,
    records: Records,
    staged: BTreeMap<EntityKey, Entity>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl TransactionScope for InMemoryTransaction {
    async fn get(&mut self, key: &EntityKey) -> Result<Option<Entity>> {
        ensure_in_group(self.group, key)?;

        if let Some(entity) = self.staged.get(key) {
            return Ok(Some(entity.clone()));
        }
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn put(&mut self, entity: Entity) -> Result<()> {
        let key = entity.key();
        ensure_in_group(self.group, &key)?;
        self.staged.insert(key, entity);
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    fn scope(&mut self) -> &mut dyn TransactionScope {
        self
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut records = self.records.write().await;
        records.extend(self.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
