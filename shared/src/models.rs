use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use thiserror::Error;

/// Column/value set bound to the insert statement, keyed by column name.
/// The `vote` column holds the ballot's JSON text as a string.
pub type InsertMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("malformed vote: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("vote document must be a JSON object")]
    NotAnObject,
    #[error("failed to serialize vote: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// One submitted ballot row. The ballot itself is kept as the exact JSON
/// text the voter sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vote {
    pub id: i64,
    pub vote: Option<Box<RawValue>>,
    #[serde(deserialize_with = "null_as_empty")]
    pub vote_hash: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub election_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub voter_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteId {
    pub id: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Vote {
    /// Parses a JSON document into a vote. Unknown fields are ignored and
    /// missing or null ones take their defaults, but the document itself
    /// has to be an object.
    pub fn decode(bytes: &[u8]) -> Result<Vote, VoteError> {
        let document: &RawValue = serde_json::from_slice(bytes).map_err(VoteError::Malformed)?;
        if !document.get().starts_with('{') {
            return Err(VoteError::NotAnObject);
        }
        serde_json::from_str(document.get()).map_err(VoteError::Malformed)
    }

    /// The ballot's JSON text, `null` when none was sent.
    pub fn payload(&self) -> &str {
        self.vote.as_deref().map_or(RawValue::NULL.get(), RawValue::get)
    }

    /// Rebuilds the ballot from stored JSON text.
    pub fn set_payload(&mut self, text: String) -> Result<(), VoteError> {
        self.vote = Some(RawValue::from_string(text).map_err(VoteError::Malformed)?);
        Ok(())
    }

    /// Everything but `id`, which the database assigns. `election_id` and
    /// `voter_id` are placeholders the caller is expected to overwrite.
    pub fn to_insert_map(&self) -> Result<InsertMap, VoteError> {
        let mut columns = InsertMap::new();
        columns.insert("vote".into(), Value::from(self.payload()));
        columns.insert("vote_hash".into(), Value::from(self.vote_hash.as_str()));
        columns.insert("election_id".into(), Value::from(self.election_id.as_str()));
        columns.insert("voter_id".into(), Value::from(self.voter_id.as_str()));
        Ok(columns)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, VoteError> {
        serde_json::to_vec(self).map_err(VoteError::Serialization)
    }
}
