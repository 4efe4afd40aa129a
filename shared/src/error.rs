use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codename carried by every error response.
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    #[error("Invalid json-encoded vote")]
    InvalidJson,
    #[error("Error inserting the vote")]
    ErrorInsert,
    #[error("Error re-writing the data to json")]
    ErrorJsonEncode,
    #[error("Error committing the vote")]
    ErrorCommit,
    #[error("Error returning the id")]
    ErrorReturn,
    #[error("Error opening a transaction")]
    ErrorBegin,
    #[error("Invalid format")]
    InvalidFormat,
    #[error("Not found")]
    NotFound,
    #[error("Database error")]
    ErrorSelect,
    #[error("Error marshalling the data")]
    MarshallError,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid request")]
    BadRequest,
    #[error("Internal server error")]
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "invalid-json",
            ErrorCode::ErrorInsert => "error-insert",
            ErrorCode::ErrorJsonEncode => "error-json-encode",
            ErrorCode::ErrorCommit => "error-commit",
            ErrorCode::ErrorReturn => "error-return",
            ErrorCode::ErrorBegin => "error-begin",
            ErrorCode::InvalidFormat => "invalid-format",
            ErrorCode::NotFound => "not-found",
            ErrorCode::ErrorSelect => "error-select",
            ErrorCode::MarshallError => "marshall-error",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::BadRequest => "bad-request",
            ErrorCode::InternalError => "internal-error",
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    pub error_codename: ErrorCode,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_codename: code,
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_codename.as_str(), self.message)
    }
}
