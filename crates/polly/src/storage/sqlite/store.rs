//! SQLite entity store.
//!
//! Implements `EntityStore` from `polly_core::storage` on top of a sqlx pool.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use polly_core::poll::PollId;
use polly_core::storage::{
    ensure_in_group, Entity, EntityKey, EntityQuery, EntityStore, RepositoryError, Result,
    StoreTransaction, TransactionScope,
};

use super::conversions::{
    format_datetime, row_to_option, row_to_poll, row_to_vote, OptionRow, PollRow, VoteRow,
};
use super::error::{map_sqlx_error, map_sqlx_error_with_id};
use super::schema;

/// SQLite-based entity store.
///
/// Every transaction takes the database write lock when it begins, so
/// transactions touching the same poll never interleave. Waiting for the lock
/// is bounded by the busy timeout; running out of time surfaces as
/// `RepositoryError::StoreUnavailable`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) a file-based database.
    ///
    /// Schema tables are created automatically.
    pub async fn new(path: &str, busy_timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .acquire_timeout(busy_timeout)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::StoreUnavailable(e.to_string()))?;

        Self::with_pool(pool).await
    }

    /// Creates a store backed by a private in-memory database.
    ///
    /// Useful for testing - data is lost when the pool is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepositoryError::StoreUnavailable(e.to_string()))?;

        // Every connection to `:memory:` is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::StoreUnavailable(e.to_string()))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(schema::CREATE_TABLES)
            .execute(&pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Schema"))?;

        Ok(Self { pool })
    }
}

// ============================================================================
// Shared statements
// ============================================================================

async fn read_entity(conn: &mut SqliteConnection, key: &EntityKey) -> Result<Option<Entity>> {
    let id = key.to_string();

    match key {
        EntityKey::Poll(poll_id) => {
            let row = sqlx::query_as::<_, PollRow>(schema::SELECT_POLL_BY_ID)
                .bind(poll_id.0)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Poll", id))?;
            row.map(row_to_poll)
                .transpose()
                .map(|poll| poll.map(Entity::Poll))
        }
        EntityKey::Option(poll_id, option_id) => {
            let row = sqlx::query_as::<_, OptionRow>(schema::SELECT_OPTION)
                .bind(poll_id.0)
                .bind(option_id.0)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Option", id))?;
            Ok(row.map(|row| Entity::Option(row_to_option(row))))
        }
        EntityKey::Vote(poll_id, voter) => {
            let row = sqlx::query_as::<_, VoteRow>(schema::SELECT_VOTE)
                .bind(poll_id.0)
                .bind(voter.as_str())
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Vote", id))?;
            row.map(row_to_vote)
                .transpose()
                .map(|vote| vote.map(Entity::Vote))
        }
    }
}

async fn write_entity(conn: &mut SqliteConnection, entity: &Entity) -> Result<()> {
    let id = entity.key().to_string();

    match entity {
        Entity::Poll(poll) => {
            sqlx::query(schema::UPSERT_POLL)
                .bind(poll.id.0)
                .bind(&poll.name)
                .bind(poll.owner.as_str())
                .bind(poll.option_count)
                .bind(poll.total_votes)
                .bind(format_datetime(&poll.created_at))
                .execute(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Poll", id))?;
        }
        Entity::Option(option) => {
            sqlx::query(schema::UPSERT_OPTION)
                .bind(option.poll_id.0)
                .bind(option.id.0)
                .bind(&option.text)
                .bind(&option.image)
                .bind(option.votes)
                .execute(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Option", id))?;
        }
        Entity::Vote(vote) => {
            sqlx::query(schema::UPSERT_VOTE)
                .bind(vote.poll_id.0)
                .bind(vote.voter.as_str())
                .bind(vote.option_id.map(|option_id| option_id.0))
                .bind(format_datetime(&vote.updated_at))
                .execute(&mut *conn)
                .await
                .map_err(|e| map_sqlx_error_with_id(e, "Vote", id))?;
        }
    }

    Ok(())
}

// ============================================================================
// EntityStore implementation
// ============================================================================

#[async_trait]
impl EntityStore for SqliteStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(e, key.kind()))?;
        read_entity(&mut conn, key).await
    }

    async fn get_multi(&self, keys: &[EntityKey]) -> Result<Vec<Option<Entity>>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(e, "Entity"))?;

        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(read_entity(&mut conn, key).await?);
        }
        Ok(results)
    }

    async fn put_multi(&self, entities: &[Entity]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, "Entity"))?;

        for entity in entities {
            write_entity(&mut tx, entity).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, "Entity"))
    }

    async fn query(&self, query: &EntityQuery) -> Result<Vec<Entity>> {
        match query {
            EntityQuery::PollsByOwner(owner) => {
                let rows = sqlx::query_as::<_, PollRow>(schema::SELECT_POLLS_BY_OWNER)
                    .bind(owner.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error(e, "Poll"))?;
                rows.into_iter()
                    .map(|row| row_to_poll(row).map(Entity::Poll))
                    .collect()
            }
        }
    }

    async fn allocate_poll_id(&self) -> Result<PollId> {
        let result = sqlx::query(schema::ALLOCATE_POLL_ID)
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Poll"))?;

        Ok(PollId(result.last_insert_rowid()))
    }

    async fn begin(&self, group: PollId) -> Result<Box<dyn StoreTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, "Poll"))?;

        sqlx::query(schema::LOCK_POLL)
            .bind(group.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error_with_id(e, "Poll", group.to_string()))?;

        Ok(Box::new(SqliteTransaction { group, tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query(schema::PING)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Store"))?;
        Ok(())
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// An open SQLite transaction pinned to one poll.
///
/// Dropping it without committing rolls back.
struct SqliteTransaction {
    group: PollId,
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl TransactionScope for SqliteTransaction {
    async fn get(&mut self, key: &EntityKey) -> Result<Option<Entity>> {
        ensure_in_group(self.group, key)?;
        read_entity(&mut self.tx, key).await
    }

    async fn put(&mut self, entity: Entity) -> Result<()> {
        ensure_in_group(self.group, &entity.key())?;
        write_entity(&mut self.tx, &entity).await
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    fn scope(&mut self) -> &mut dyn TransactionScope {
        self
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let group = self.group;
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error_with_id(e, "Poll", group.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let group = self.group;
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error_with_id(e, "Poll", group.to_string()))
    }
}
