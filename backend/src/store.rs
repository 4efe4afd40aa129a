use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use ballotbox_shared::models::{InsertMap, Vote, VoteError};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("column {0} is missing or not a string")]
    BadColumn(&'static str),
    #[error("stored ballot is not valid JSON: {0}")]
    BadPayload(#[from] VoteError),
    #[error("store lock poisoned")]
    LockFailed,
}

/// Storage for vote rows. Writes go through a [`BallotTx`] so that every
/// insert is committed or rolled back as a unit.
#[rocket::async_trait]
pub trait BallotStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn BallotTx>, StoreError>;

    /// Rows matching the composite key, lowest id first.
    async fn find_votes(
        &self,
        election_id: &str,
        voter_id: &str,
        vote_hash: &str,
    ) -> Result<Vec<Vote>, StoreError>;
}

/// A transaction that is rolled back if dropped without being committed.
#[rocket::async_trait]
pub trait BallotTx: Send {
    /// Inserts one row and returns its generated id.
    async fn insert_vote(&mut self, columns: &InsertMap) -> Result<i64, StoreError>;

    /// On failure nothing staged in this transaction becomes visible.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

pub(crate) fn text_column(columns: &InsertMap, name: &'static str) -> Result<String, StoreError> {
    columns
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(StoreError::BadColumn(name))
}

/// Rebuilds a row from its stored columns; `vote` is the ballot's JSON text.
pub(crate) fn stored_vote(
    id: i64,
    vote: String,
    vote_hash: String,
    election_id: String,
    voter_id: String,
) -> Result<Vote, StoreError> {
    let mut row = Vote {
        id,
        vote: None,
        vote_hash,
        election_id,
        voter_id,
    };
    row.set_payload(vote)?;
    Ok(row)
}

#[derive(Default)]
struct MemoryInner {
    votes: Mutex<Vec<Vote>>,
    next_id: AtomicI64,
}

/// Process-local store. Ids are drawn at insert time, so a rolled back
/// insert still consumes one, as a database sequence would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.inner.votes.lock().map(|votes| votes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[rocket::async_trait]
impl BallotStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn BallotTx>, StoreError> {
        Ok(Box::new(MemoryTx {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
        }))
    }

    async fn find_votes(
        &self,
        election_id: &str,
        voter_id: &str,
        vote_hash: &str,
    ) -> Result<Vec<Vote>, StoreError> {
        let votes = self.inner.votes.lock().map_err(|_| StoreError::LockFailed)?;
        let mut found: Vec<Vote> = votes
            .iter()
            .filter(|v| {
                v.election_id == election_id && v.voter_id == voter_id && v.vote_hash == vote_hash
            })
            .cloned()
            .collect();
        found.sort_by_key(|v| v.id);
        Ok(found)
    }
}

struct MemoryTx {
    inner: Arc<MemoryInner>,
    staged: Vec<Vote>,
}

#[rocket::async_trait]
impl BallotTx for MemoryTx {
    async fn insert_vote(&mut self, columns: &InsertMap) -> Result<i64, StoreError> {
        let vote = stored_vote(
            0,
            text_column(columns, "vote")?,
            text_column(columns, "vote_hash")?,
            text_column(columns, "election_id")?,
            text_column(columns, "voter_id")?,
        )?;
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.staged.push(Vote { id, ..vote });
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { inner, staged } = *self;
        let mut votes = inner.votes.lock().map_err(|_| StoreError::LockFailed)?;
        votes.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
