#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::error::{ErrorBody, ErrorCode};
    use crate::models::{Vote, VoteError, VoteId};

    fn vote(payload: &str, hash: &str) -> Vote {
        let mut vote = Vote {
            id: 7,
            vote_hash: hash.into(),
            election_id: "e1".into(),
            voter_id: "v1".into(),
            ..Default::default()
        };
        vote.set_payload(payload.into()).unwrap();
        vote
    }

    #[test]
    fn test_decode_partial_document() {
        let v = Vote::decode(br#"{"vote":"abc","vote_hash":"h1"}"#).unwrap();
        assert_eq!(v.payload(), r#""abc""#);
        assert_eq!(v.vote_hash, "h1");
        assert_eq!(v.id, 0);
        assert!(v.election_id.is_empty());
        assert!(v.voter_id.is_empty());

        let v = Vote::decode(br#"{"vote_hash":"h1"}"#).unwrap();
        assert_eq!(v.payload(), "null");
        assert!(v.vote.is_none());
    }

    #[test]
    fn test_decode_null_strings_as_empty() {
        let v = Vote::decode(
            br#"{"vote":"abc","vote_hash":null,"election_id":null,"voter_id":null}"#,
        )
        .unwrap();
        assert_eq!(v.vote_hash, "");
        assert_eq!(v.election_id, "");
        assert_eq!(v.voter_id, "");

        let v = Vote::decode(br#"{"vote":null,"vote_hash":"h1"}"#).unwrap();
        assert_eq!(v.payload(), "null");
    }

    #[test]
    fn test_decode_keeps_structured_payload_verbatim() {
        let body = br#"{"vote":{"choices": [3, 1, 2], "proof": {"c": "0x1f"}},"vote_hash":"h2","extra":true}"#;
        let v = Vote::decode(body).unwrap();
        assert_eq!(v.payload(), r#"{"choices": [3, 1, 2], "proof": {"c": "0x1f"}}"#);
    }

    #[test]
    fn test_payload_survives_storage_round_trip() {
        let body = br#"{"vote":{"zeta":1,"alpha":2.50,"big":123456789012345678901234567890},"vote_hash":"h1"}"#;
        let payload = r#"{"zeta":1,"alpha":2.50,"big":123456789012345678901234567890}"#;

        let decoded = Vote::decode(body).unwrap();
        let columns = decoded.to_insert_map().unwrap();
        assert_eq!(columns["vote"], json!(payload));

        let stored = columns["vote"].as_str().unwrap().to_owned();
        let mut fetched = vote("null", "h1");
        fetched.set_payload(stored).unwrap();
        assert_eq!(fetched.payload(), payload);

        let text = String::from_utf8(fetched.to_json().unwrap()).unwrap();
        assert!(text.contains(&format!(r#""vote":{payload}"#)), "{text}");
    }

    #[test]
    fn test_set_payload_rejects_invalid_text() {
        let mut v = Vote::default();
        assert!(matches!(v.set_payload("{oops".into()), Err(VoteError::Malformed(_))));
        assert!(v.vote.is_none());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(Vote::decode(b"{not json"), Err(VoteError::Malformed(_))));
        assert!(matches!(Vote::decode(b""), Err(VoteError::Malformed(_))));
        assert!(matches!(Vote::decode(b"[]"), Err(VoteError::NotAnObject)));
        assert!(matches!(Vote::decode(b"\"abc\""), Err(VoteError::NotAnObject)));
        assert!(matches!(
            Vote::decode(br#"{"vote":"abc","vote_hash":5}"#),
            Err(VoteError::Malformed(_))
        ));
    }

    #[test]
    fn test_insert_map_drops_id() {
        let columns = vote(r#""abc""#, "h1").to_insert_map().unwrap();
        assert!(!columns.contains_key("id"));

        let mut keys: Vec<_> = columns.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["election_id", "vote", "vote_hash", "voter_id"]);
        assert_eq!(columns["vote"], json!(r#""abc""#));
        assert_eq!(columns["vote_hash"], json!("h1"));
    }

    #[test]
    fn test_to_json_shape() {
        let bytes = vote(r#""abc""#, "h1").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({
            "id": 7,
            "vote": "abc",
            "vote_hash": "h1",
            "election_id": "e1",
            "voter_id": "v1"
        }));
    }

    #[test]
    fn test_wire_types() {
        assert_eq!(serde_json::to_string(&VoteId { id: 1 }).unwrap(), r#"{"id":1}"#);

        let body = ErrorBody::new(ErrorCode::InvalidFormat, "Invalid hash format");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"message": "Invalid hash format", "error_codename": "invalid-format"})
        );
    }

    #[test]
    fn test_codenames_match_serde() {
        let codes = [
            ErrorCode::InvalidJson,
            ErrorCode::ErrorInsert,
            ErrorCode::ErrorJsonEncode,
            ErrorCode::ErrorCommit,
            ErrorCode::ErrorReturn,
            ErrorCode::ErrorBegin,
            ErrorCode::InvalidFormat,
            ErrorCode::NotFound,
            ErrorCode::ErrorSelect,
            ErrorCode::MarshallError,
            ErrorCode::Unauthorized,
            ErrorCode::BadRequest,
            ErrorCode::InternalError,
        ];
        for code in codes {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
        }
    }
}
