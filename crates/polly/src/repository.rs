//! Poll repository.
//!
//! Translates between domain entities and the keyed records of an
//! [`EntityStore`].

use std::sync::Arc;

use polly_core::poll::{validate_new_poll, NewPoll, Poll, PollId, PollOption, UserId, Vote};
use polly_core::storage::{Entity, EntityKey, EntityQuery, EntityStore, Result};

/// CRUD access to polls, their options and vote records.
#[derive(Clone)]
pub struct PollRepository {
    store: Arc<dyn EntityStore>,
}

impl PollRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Creates a poll and its options, numbered 1..N in submission order.
    ///
    /// The poll and all options are written in a single batch.
    pub async fn create_poll(&self, new_poll: NewPoll) -> Result<PollId> {
        validate_new_poll(&new_poll)?;

        let poll_id = self.store.allocate_poll_id().await?;
        let options = new_poll.options_for(poll_id);
        let poll = Poll::new(
            poll_id,
            new_poll.name,
            new_poll.owner,
            options.len() as i64,
        );

        let mut records: Vec<Entity> = Vec::with_capacity(options.len() + 1);
        records.push(poll.into());
        records.extend(options.into_iter().map(Entity::from));

        self.store.put_multi(&records).await?;

        tracing::info!(poll_id = %poll_id, options = records.len() - 1, "Created poll");
        Ok(poll_id)
    }

    pub async fn get_poll(&self, poll_id: PollId) -> Result<Poll> {
        let key = EntityKey::Poll(poll_id);
        match self.store.get(&key).await? {
            Some(entity) => entity.into_poll(),
            None => Err(key.not_found()),
        }
    }

    /// Fetches every option of a poll, in submission order.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn get_options(&self, poll_id: PollId) -> Result<Vec<PollOption>> {
        let poll = self.get_poll(poll_id).await?;
        self.options_of(&poll).await
    }

    /// Fetches the options of an already loaded poll by direct key.
    pub async fn options_of(&self, poll: &Poll) -> Result<Vec<PollOption>> {
        let keys: Vec<EntityKey> = poll
            .option_ids()
            .map(|option_id| EntityKey::Option(poll.id, option_id))
            .collect();

        let entities = self.store.get_multi(&keys).await?;

        keys.iter()
            .zip(entities)
            .map(|(key, entity)| match entity {
                Some(entity) => entity.into_option(),
                None => Err(key.not_found()),
            })
            .collect()
    }

    /// Polls owned by `owner`, newest first.
    pub async fn list_polls(&self, owner: &UserId) -> Result<Vec<Poll>> {
        self.store
            .query(&EntityQuery::PollsByOwner(owner.clone()))
            .await?
            .into_iter()
            .map(Entity::into_poll)
            .collect()
    }

    /// The voter's current vote on a poll, if any.
    pub async fn get_vote(&self, poll_id: PollId, voter: &UserId) -> Result<Option<Vote>> {
        let key = EntityKey::Vote(poll_id, voter.clone());
        self.store
            .get(&key)
            .await?
            .map(Entity::into_vote)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use polly_core::poll::{NewOption, OptionId};
    use polly_core::storage::RepositoryError;

    fn repository() -> PollRepository {
        PollRepository::new(Arc::new(InMemoryStore::new()))
    }

    fn new_poll(owner: &str, name: &str, options: &[&str]) -> NewPoll {
        NewPoll {
            name: name.to_string(),
            owner: UserId::new(owner),
            options: options
                .iter()
                .map(|text| NewOption {
                    text: text.to_string(),
                    image: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_poll() {
        let repo = repository();

        let poll_id = repo
            .create_poll(new_poll("alice", "T", &["A", "B"]))
            .await
            .unwrap();

        let poll = repo.get_poll(poll_id).await.unwrap();
        assert_eq!(poll.name, "T");
        assert_eq!(poll.owner, UserId::new("alice"));
        assert_eq!(poll.option_count, 2);
        assert_eq!(poll.total_votes, 0);

        let options = repo.get_options(poll_id).await.unwrap();
        let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B"]);
        assert_eq!(options[0].id, OptionId(1));
        assert_eq!(options[1].id, OptionId(2));
        assert!(options.iter().all(|o| o.votes == 0));
    }

    #[tokio::test]
    async fn test_create_poll_keeps_images() {
        let repo = repository();
        let mut request = new_poll("alice", "Pets", &["Cat", "Dog"]);
        request.options[1].image = Some("dog.png".to_string());

        let poll_id = repo.create_poll(request).await.unwrap();
        let poll = repo.get_poll(poll_id).await.unwrap();
        let options = repo.options_of(&poll).await.unwrap();

        assert_eq!(options[0].image, None);
        assert_eq!(options[1].image.as_deref(), Some("dog.png"));
    }

    #[tokio::test]
    async fn test_create_poll_with_one_option_persists_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let repo = PollRepository::new(store.clone());

        let result = repo.create_poll(new_poll("alice", "T", &["A"])).await;

        assert!(matches!(result, Err(RepositoryError::InvalidArgument(_))));
        let polls = repo.list_polls(&UserId::new("alice")).await.unwrap();
        assert!(polls.is_empty());
        assert!(store
            .get(&EntityKey::Option(PollId(1), OptionId(1)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_get_poll_not_found() {
        let repo = repository();

        let result = repo.get_poll(PollId(42)).await;

        assert!(matches!(
            result,
            Err(RepositoryError::NotFound {
                entity_type: "Poll",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_get_options_missing_option_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let repo = PollRepository::new(store.clone());
        let poll = Poll::new(PollId(5), "Broken", UserId::new("alice"), 2);
        store
            .put_multi(&[
                poll.clone().into(),
                PollOption::new(PollId(5), OptionId(1), "A").into(),
            ])
            .await
            .unwrap();

        let result = repo.get_options(poll.id).await;

        assert!(matches!(
            result,
            Err(RepositoryError::NotFound {
                entity_type: "Option",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_list_polls_only_returns_owned_polls() {
        let repo = repository();
        repo.create_poll(new_poll("alice", "First", &["A", "B"]))
            .await
            .unwrap();
        repo.create_poll(new_poll("bob", "Other", &["A", "B"]))
            .await
            .unwrap();
        repo.create_poll(new_poll("alice", "Second", &["A", "B"]))
            .await
            .unwrap();

        let polls = repo.list_polls(&UserId::new("alice")).await.unwrap();

        assert_eq!(polls.len(), 2);
        assert!(polls.iter().all(|p| p.owner == UserId::new("alice")));
    }

    #[tokio::test]
    async fn test_get_vote_absent() {
        let repo = repository();
        let vote = repo
            .get_vote(PollId(1), &UserId::new("carol"))
            .await
            .unwrap();
        assert!(vote.is_none());
    }
}
