//! Vote transaction engine.
//!
//! Casting a ballot reads the target option, the voter's vote record and
//! whichever counters the transition touches, then writes them back in one
//! transaction scoped to the poll.

use polly_core::poll::{
    transition, Ballot, BallotState, OptionId, PollId, UserId, Vote, VoteOutcome, VoteTransition,
};
use polly_core::storage::{
    run_in_transaction, Entity, EntityKey, EntityStore, Result, TransactionScope,
};

/// Casts or changes `ballot.voter`'s vote on a poll.
///
/// Voting again for the current option changes nothing. Every read and write
/// happens inside a single transaction on the poll's entity group; on any
/// error nothing is persisted.
pub async fn cast_vote(store: &dyn EntityStore, ballot: Ballot) -> Result<VoteOutcome> {
    let Ballot {
        poll_id,
        option_id,
        voter,
    } = ballot;

    let outcome = run_in_transaction(store, poll_id, move |tx| {
        Box::pin(apply_ballot(tx, poll_id, option_id, voter))
    })
    .await?;

    tracing::debug!(
        poll_id = %poll_id,
        option_id = %option_id,
        outcome = ?outcome,
        "Ballot committed"
    );

    Ok(outcome)
}

async fn apply_ballot(
    tx: &mut dyn TransactionScope,
    poll_id: PollId,
    option_id: OptionId,
    voter: UserId,
) -> Result<VoteOutcome> {
    let mut target = require(tx, EntityKey::Option(poll_id, option_id))
        .await?
        .into_option()?;

    let existing = tx
        .get(&EntityKey::Vote(poll_id, voter.clone()))
        .await?
        .map(Entity::into_vote)
        .transpose()?;

    let change = transition(BallotState::from_vote(existing.as_ref()), option_id);

    match change {
        VoteTransition::Unchanged => return Ok(VoteOutcome::Unchanged),
        VoteTransition::FirstVote => {
            let mut poll = require(tx, EntityKey::Poll(poll_id)).await?.into_poll()?;
            poll.count_new_voter();
            tx.put(poll.into()).await?;
        }
        VoteTransition::Switch { from } => {
            let mut previous = require(tx, EntityKey::Option(poll_id, from))
                .await?
                .into_option()?;
            previous.debit()?;
            tx.put(previous.into()).await?;
        }
    }

    target.credit();
    tx.put(target.into()).await?;

    let vote = match existing {
        Some(mut vote) => {
            vote.point_at(option_id);
            vote
        }
        None => Vote::new(poll_id, voter, option_id),
    };
    tx.put(vote.into()).await?;

    Ok(change.into())
}

async fn require(tx: &mut dyn TransactionScope, key: EntityKey) -> Result<Entity> {
    match tx.get(&key).await? {
        Some(entity) => Ok(entity),
        None => Err(key.not_found()),
    }
}


#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::repository::PollRepository;
    use crate::storage::SqliteStore;
    use polly_core::poll::{NewOption, NewPoll};
    use polly_core::storage::RepositoryError;

    /// File-backed store, so concurrent transactions use separate connections.
    async fn setup(
        dir: &TempDir,
        busy_timeout: Duration,
    ) -> (Arc<SqliteStore>, PollRepository, PollId) {
        let path = dir.path().join("polly.db");
        let store = Arc::new(
            SqliteStore::new(path.to_str().unwrap(), busy_timeout)
                .await
                .unwrap(),
        );
        let repo = PollRepository::new(store.clone());
        let poll_id = repo
            .create_poll(NewPoll {
                name: "Lunch".to_string(),
                owner: UserId::new("owner"),
                options: ["A", "B"]
                    .iter()
                    .map(|text| NewOption {
                        text: text.to_string(),
                        image: None,
                    })
                    .collect(),
            })
            .await
            .unwrap();
        (store, repo, poll_id)
    }

    fn ballot(poll_id: PollId, option: i64, voter: &str) -> Ballot {
        Ballot {
            poll_id,
            option_id: OptionId(option),
            voter: UserId::new(voter),
        }
    }

    async fn counts(repo: &PollRepository, poll_id: PollId) -> (i64, Vec<i64>) {
        let poll = repo.get_poll(poll_id).await.unwrap();
        let options = repo.options_of(&poll).await.unwrap();
        (poll.total_votes, options.iter().map(|o| o.votes).collect())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_voters_queue_on_the_write_lock() {
        const VOTERS: usize = 32;
        let dir = TempDir::new().unwrap();
        let (store, repo, poll_id) = setup(&dir, Duration::from_secs(10)).await;

        let handles: Vec<_> = (0..VOTERS)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    cast_vote(&*store, ballot(poll_id, 1, &format!("voter-{i}"))).await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), VoteOutcome::Counted);
        }

        assert_eq!(counts(&repo, poll_id).await, (VOTERS as i64, vec![VOTERS as i64, 0]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_switches_keep_counts_consistent() {
        const VOTERS: usize = 16;
        let dir = TempDir::new().unwrap();
        let (store, repo, poll_id) = setup(&dir, Duration::from_secs(10)).await;

        for i in 0..VOTERS {
            cast_vote(&*store, ballot(poll_id, 1, &format!("voter-{i}")))
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..VOTERS)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    cast_vote(&*store, ballot(poll_id, 2, &format!("voter-{i}"))).await
                })
            })
            .collect();

        for handle in handles {
            assert!(matches!(
                handle.await.unwrap().unwrap(),
                VoteOutcome::Moved { from: OptionId(1) }
            ));
        }

        assert_eq!(counts(&repo, poll_id).await, (VOTERS as i64, vec![0, VOTERS as i64]));
    }

    #[tokio::test]
    async fn test_lock_contention_is_store_unavailable_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (store, repo, poll_id) = setup(&dir, Duration::from_millis(100)).await;

        let held = store.begin(poll_id).await.unwrap();

        let result = cast_vote(&*store, ballot(poll_id, 1, "bob")).await;

        assert!(
            matches!(result, Err(RepositoryError::StoreUnavailable(_))),
            "unexpected result: {result:?}"
        );

        held.rollback().await.unwrap();
        assert_eq!(counts(&repo, poll_id).await, (0, vec![0, 0]));
        assert!(repo
            .get_vote(poll_id, &UserId::new("bob"))
            .await
            .unwrap()
            .is_none());

        // The engine works again once the lock is released.
        let outcome = cast_vote(&*store, ballot(poll_id, 1, "bob")).await.unwrap();
        assert_eq!(outcome, VoteOutcome::Counted);
    }
}
