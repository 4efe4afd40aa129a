use shuttle_runtime::SecretStore;
use thiserror::Error;
use time::Duration;

pub const SHARED_SECRET_KEY: &str = "BALLOTBOX_SHARED_SECRET";
pub const SESSION_EXPIRE_KEY: &str = "BALLOTBOX_SESSION_EXPIRE";

/// Seconds a signed permission token stays valid.
pub const DEFAULT_SESSION_EXPIRE: i64 = 3600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingSecret(&'static str),
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidSessionExpire { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    shared_secret: String,
    session_expire: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("shared_secret", &"<redacted>")
            .field("session_expire", &self.session_expire)
            .finish()
    }
}

impl Config {
    pub fn new(shared_secret: impl Into<String>, session_expire: Duration) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            session_expire,
        }
    }

    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shared_secret = lookup(SHARED_SECRET_KEY)
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::MissingSecret(SHARED_SECRET_KEY))?;

        let session_expire = match lookup(SESSION_EXPIRE_KEY) {
            None => DEFAULT_SESSION_EXPIRE,
            Some(value) => match value.trim().parse::<i64>() {
                Ok(seconds) if seconds > 0 => seconds,
                _ => {
                    return Err(ConfigError::InvalidSessionExpire {
                        key: SESSION_EXPIRE_KEY,
                        value,
                    })
                }
            },
        };

        Ok(Self::new(shared_secret, Duration::seconds(session_expire)))
    }

    pub fn shared_secret(&self) -> &[u8] {
        self.shared_secret.as_bytes()
    }

    pub fn session_expire(&self) -> Duration {
        self.session_expire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_session_window() {
        let config = Config::from_lookup(lookup(&[(SHARED_SECRET_KEY, "s3cret")])).unwrap();
        assert_eq!(config.shared_secret(), b"s3cret");
        assert_eq!(config.session_expire(), Duration::seconds(3600));
    }

    #[test]
    fn reads_session_window() {
        let config = Config::from_lookup(lookup(&[
            (SHARED_SECRET_KEY, "s3cret"),
            (SESSION_EXPIRE_KEY, " 60 "),
        ]))
        .unwrap();
        assert_eq!(config.session_expire(), Duration::seconds(60));
    }

    #[test]
    fn rejects_missing_or_blank_secret() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingSecret(SHARED_SECRET_KEY)
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(SHARED_SECRET_KEY, "  ")])).unwrap_err(),
            ConfigError::MissingSecret(SHARED_SECRET_KEY)
        );
    }

    #[test]
    fn rejects_bad_session_window() {
        for value in ["0", "-5", "soon"] {
            let err = Config::from_lookup(lookup(&[
                (SHARED_SECRET_KEY, "s3cret"),
                (SESSION_EXPIRE_KEY, value),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSessionExpire { .. }));
        }
    }

    #[test]
    fn debug_hides_secret() {
        let config = Config::new("s3cret", Duration::seconds(10));
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
