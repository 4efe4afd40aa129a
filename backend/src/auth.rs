use ring::hmac;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use crate::config::Config;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "khmac:///";
const HASH_ALGORITHM: &str = "sha-256";

/// Scope a voter must hold to submit or read their own vote.
pub const VOTER_SCOPE: &str = "voter-${election_id}-${voter_id}";

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("malformed token")]
    Malformed,
    #[error("unsupported hash algorithm {0:?}")]
    UnsupportedAlgorithm(String),
    #[error("token scope {got:?} does not match {expected:?}")]
    ScopeMismatch { expected: String, got: String },
    #[error("token expired")]
    Expired,
    #[error("bad signature")]
    BadSignature,
}

/// A permission scope with `${name}` placeholders filled from route
/// parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScopeTemplate(&'static str);

impl ScopeTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    /// Unknown or unterminated placeholders expand to nothing and are kept
    /// verbatim respectively.
    pub fn expand<'a, F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    out.push_str(lookup(&after[..end]).unwrap_or_default());
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Verifies `khmac:///sha-256;<hex hmac>/<scope>:<unix seconds>` tokens
/// signed with a secret shared with the token issuer.
pub struct SharedSecretAuth {
    key: hmac::Key,
    expire: Duration,
}

impl SharedSecretAuth {
    pub fn new(secret: &[u8], expire: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            expire,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shared_secret(), config.session_expire())
    }

    pub fn session_expire(&self) -> Duration {
        self.expire
    }

    /// Issues a token for `scope` stamped with `timestamp`.
    pub fn sign(&self, scope: &str, timestamp: i64) -> String {
        let message = format!("{}:{}", scope, timestamp);
        let tag = hmac::sign(&self.key, message.as_bytes());
        format!("{}{};{}/{}", TOKEN_PREFIX, HASH_ALGORITHM, hex::encode(tag.as_ref()), message)
    }

    pub fn verify(&self, token: &str, scope: &str) -> Result<(), AuthError> {
        self.verify_at(token, scope, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn verify_at(&self, token: &str, scope: &str, now: i64) -> Result<(), AuthError> {
        let body = token.trim().strip_prefix(TOKEN_PREFIX).ok_or(AuthError::Malformed)?;
        let (algorithm_and_hash, message) = body.split_once('/').ok_or(AuthError::Malformed)?;
        let (algorithm, hash) = algorithm_and_hash.split_once(';').ok_or(AuthError::Malformed)?;
        if algorithm != HASH_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(algorithm.to_string()));
        }

        let (token_scope, timestamp) = message.rsplit_once(':').ok_or(AuthError::Malformed)?;
        if token_scope != scope {
            return Err(AuthError::ScopeMismatch {
                expected: scope.to_string(),
                got: token_scope.to_string(),
            });
        }
        let issued_at: i64 = timestamp.parse().map_err(|_| AuthError::Malformed)?;
        if now.saturating_sub(issued_at) > self.expire.whole_seconds() {
            return Err(AuthError::Expired);
        }

        let tag = hex::decode(hash).map_err(|_| AuthError::Malformed)?;
        hmac::verify(&self.key, message.as_bytes(), &tag).map_err(|_| AuthError::BadSignature)
    }
}

/// Request guard proving the caller holds `voter-{election_id}-{voter_id}`
/// for the first two routed segments.
#[derive(Debug)]
pub struct VoterPermit {
    pub scope: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterPermit {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth = match req.guard::<&State<SharedSecretAuth>>().await {
            Outcome::Success(auth) => auth,
            _ => {
                error!("SharedSecretAuth is not managed; refusing request");
                return Outcome::Error((Status::InternalServerError, AuthError::Missing));
            }
        };

        let election_id = req.param::<&str>(0).and_then(Result::ok);
        let voter_id = req.param::<&str>(1).and_then(Result::ok);
        let scope = ScopeTemplate::new(VOTER_SCOPE).expand(|name| match name {
            "election_id" => election_id,
            "voter_id" => voter_id,
            _ => None,
        });

        let Some(token) = req.headers().get_one(AUTHORIZATION_HEADER) else {
            debug!(%scope, "Permission denied: no token");
            return Outcome::Error((Status::Unauthorized, AuthError::Missing));
        };

        match auth.verify(token, &scope) {
            Ok(()) => Outcome::Success(VoterPermit { scope }),
            Err(e) => {
                debug!(%scope, "Permission denied: {}", e);
                Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}
