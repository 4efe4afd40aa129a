use rocket::data::{Data, Limits, ToByteUnit};
use rocket::http::ContentType;
use rocket::{get, post, State};
use ballotbox_shared::error::ErrorCode;
use tracing::instrument;

use crate::auth::VoterPermit;
use crate::ballotbox::BallotBox;
use crate::error::HandledError;

#[instrument(skip(ballot_box, _permit, body, limits))]
#[post("/<election_id>/<voter_id>", data = "<body>")]
pub async fn post_vote(
    ballot_box: &State<BallotBox>,
    _permit: VoterPermit,
    election_id: &str,
    voter_id: &str,
    limits: &Limits,
    body: Data<'_>,
) -> Result<(ContentType, Vec<u8>), HandledError> {
    let limit = limits.get("json").unwrap_or(1.mebibytes());
    let bytes = body.open(limit).into_bytes().await.map_err(|e| {
        HandledError::bad_request(ErrorCode::InvalidJson, "Invalid json-encoded vote").caused_by(e)
    })?;
    if !bytes.is_complete() {
        return Err(HandledError::bad_request(
            ErrorCode::InvalidJson,
            format!("Vote exceeds the {} body limit", limit),
        ));
    }

    let id = ballot_box.cast_vote(election_id, voter_id, &bytes).await?;
    Ok((ContentType::JSON, id))
}

#[instrument(skip(ballot_box, _permit))]
#[get("/<election_id>/<voter_id>/<vote_hash>")]
pub async fn get_vote(
    ballot_box: &State<BallotBox>,
    _permit: VoterPermit,
    election_id: &str,
    voter_id: &str,
    vote_hash: &str,
) -> Result<(ContentType, Vec<u8>), HandledError> {
    let vote = ballot_box.fetch_vote(election_id, voter_id, vote_hash).await?;
    Ok((ContentType::JSON, vote))
}
