use sqlx::postgres::{PgRow, PgStatement};
use sqlx::{Executor, PgPool, Postgres, Row, Statement, Transaction};
use ballotbox_shared::models::{InsertMap, Vote};

use crate::store::{stored_vote, text_column, BallotStore, BallotTx, StoreError};

pub const INSERT_VOTE: &str =
    "INSERT INTO votes (vote, vote_hash, election_id, voter_id) VALUES ($1, $2, $3, $4) RETURNING id";

pub const SELECT_VOTE: &str =
    "SELECT id, vote, vote_hash, election_id, voter_id FROM votes
     WHERE election_id = $1 AND voter_id = $2 AND vote_hash = $3
     ORDER BY id";

/// `votes` table access through two statements prepared up front.
pub struct PgBallotStore {
    pool: PgPool,
    insert: PgStatement<'static>,
    select: PgStatement<'static>,
}

impl PgBallotStore {
    /// Fails if either statement does not prepare against the current schema.
    pub async fn prepare(pool: PgPool) -> Result<Self, StoreError> {
        let insert = (&pool).prepare(INSERT_VOTE).await?;
        let select = (&pool).prepare(SELECT_VOTE).await?;
        Ok(Self { pool, insert, select })
    }
}

#[rocket::async_trait]
impl BallotStore for PgBallotStore {
    async fn begin(&self) -> Result<Box<dyn BallotTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBallotTx {
            tx,
            insert: self.insert.clone(),
        }))
    }

    async fn find_votes(
        &self,
        election_id: &str,
        voter_id: &str,
        vote_hash: &str,
    ) -> Result<Vec<Vote>, StoreError> {
        let rows = self
            .select
            .query()
            .bind(election_id)
            .bind(voter_id)
            .bind(vote_hash)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(vote_from_row).collect()
    }
}

fn vote_from_row(row: &PgRow) -> Result<Vote, StoreError> {
    stored_vote(
        row.try_get("id")?,
        row.try_get("vote")?,
        row.try_get("vote_hash")?,
        row.try_get("election_id")?,
        row.try_get("voter_id")?,
    )
}

struct PgBallotTx {
    tx: Transaction<'static, Postgres>,
    insert: PgStatement<'static>,
}

#[rocket::async_trait]
impl BallotTx for PgBallotTx {
    async fn insert_vote(&mut self, columns: &InsertMap) -> Result<i64, StoreError> {
        let vote = text_column(columns, "vote")?;
        let vote_hash = text_column(columns, "vote_hash")?;
        let election_id = text_column(columns, "election_id")?;
        let voter_id = text_column(columns, "voter_id")?;

        let row = self
            .insert
            .query()
            .bind(vote)
            .bind(vote_hash)
            .bind(election_id)
            .bind(voter_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.try_get("id")?)
    }

    // A failed commit drops the transaction, which rolls it back.
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
