use std::sync::Arc;

use ballotbox_shared::error::ErrorCode;
use ballotbox_shared::models::{Vote, VoteId};
use rocket::{routes, Build, Rocket};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::HandledError;
use crate::routes::{get_vote, post_vote};
use crate::server::{Module, ServerContext};
use crate::store::{BallotStore, BallotTx};

pub const MODULE_NAME: &str = "ballotbox";
pub const MOUNT_POINT: &str = "/api/v1/ballotbox";

/// Stores and serves individual votes. Holds no vote state of its own;
/// every call goes to the store.
pub struct BallotBox {
    store: Arc<dyn BallotStore>,
}

impl BallotBox {
    pub fn new(ctx: &ServerContext) -> Self {
        Self {
            store: Arc::clone(&ctx.store),
        }
    }

    /// Stores the vote in `body` for the given election and voter and
    /// returns the JSON-encoded `{"id": ...}` of the new row. Path values
    /// replace any `election_id`/`voter_id` carried in the body.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn cast_vote(
        &self,
        election_id: &str,
        voter_id: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, HandledError> {
        let mut tx = self.store.begin().await.map_err(|e| {
            HandledError::internal(ErrorCode::ErrorBegin, "Error opening a transaction").caused_by(e)
        })?;

        let vote = match Vote::decode(body) {
            Ok(vote) => vote,
            Err(e) => {
                let err = HandledError::bad_request(ErrorCode::InvalidJson, "Invalid json-encoded vote");
                return Err(abort(tx, err.caused_by(e)).await);
            }
        };

        let mut columns = match vote.to_insert_map() {
            Ok(columns) => columns,
            Err(e) => {
                let err = HandledError::internal(
                    ErrorCode::ErrorJsonEncode,
                    "Error re-writing the data to json",
                );
                return Err(abort(tx, err.caused_by(e)).await);
            }
        };

        if election_id.is_empty() {
            let err = HandledError::bad_request(ErrorCode::ErrorInsert, "No election_id");
            return Err(abort(tx, err).await);
        }
        if voter_id.is_empty() {
            let err = HandledError::bad_request(ErrorCode::ErrorInsert, "No voter_id");
            return Err(abort(tx, err).await);
        }
        columns.insert("election_id".into(), Value::from(election_id));
        columns.insert("voter_id".into(), Value::from(voter_id));

        let id = match tx.insert_vote(&columns).await {
            Ok(id) => id,
            Err(e) => {
                let err = HandledError::internal(
                    ErrorCode::ErrorInsert,
                    format!("Error inserting the vote: {}", e),
                );
                return Err(abort(tx, err).await);
            }
        };

        tx.commit().await.map_err(|e| {
            HandledError::internal(ErrorCode::ErrorCommit, "Error committing the vote").caused_by(e)
        })?;
        info!(id, "Stored vote");

        serde_json::to_vec(&VoteId { id }).map_err(|e| {
            HandledError::internal(ErrorCode::ErrorReturn, "Error returning the id").caused_by(e)
        })
    }

    /// JSON of the vote stored under the composite key. Should the key
    /// match several rows, the oldest one wins.
    #[instrument(skip(self))]
    pub async fn fetch_vote(
        &self,
        election_id: &str,
        voter_id: &str,
        vote_hash: &str,
    ) -> Result<Vec<u8>, HandledError> {
        // Missing ids and a missing hash are reported with different codes;
        // API clients already branch on these.
        if election_id.is_empty() {
            return Err(HandledError::bad_request(ErrorCode::ErrorInsert, "No election_id"));
        }
        if voter_id.is_empty() {
            return Err(HandledError::bad_request(ErrorCode::ErrorInsert, "No voter_id"));
        }
        if vote_hash.is_empty() {
            return Err(HandledError::bad_request(ErrorCode::InvalidFormat, "Invalid hash format"));
        }

        let votes = self
            .store
            .find_votes(election_id, voter_id, vote_hash)
            .await
            .map_err(|e| HandledError::internal(ErrorCode::ErrorSelect, "Database error").caused_by(e))?;

        let Some(vote) = votes.first() else {
            return Err(HandledError::not_found("Not found"));
        };
        if votes.len() > 1 {
            debug!(matches = votes.len(), "Several votes share one key");
        }

        vote.to_json().map_err(|e| {
            HandledError::internal(ErrorCode::MarshallError, "Error marshalling the data").caused_by(e)
        })
    }
}

/// Ends `tx` before `err` is reported.
async fn abort(tx: Box<dyn BallotTx>, err: HandledError) -> HandledError {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback failed after {}: {}", err.code.as_str(), e);
    }
    err
}

impl Module for BallotBox {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn init(self: Box<Self>, rocket: Rocket<Build>) -> Rocket<Build> {
        rocket
            .manage(*self)
            .mount(MOUNT_POINT, routes![post_vote, get_vote])
    }
}
