use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use ballotbox_shared::error::{ErrorBody, ErrorCode};
use tracing::{debug, error};

/// An error that has been mapped to its HTTP status and codename and is ready
/// to be written back to the client.
#[derive(Debug)]
pub struct HandledError {
    pub status: Status,
    pub code: ErrorCode,
    pub message: String,
    pub source: Option<String>,
}

impl HandledError {
    pub fn new(status: Status, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, ErrorCode::NotFound, message)
    }

    pub fn internal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, code, message)
    }

    pub fn caused_by(mut self, err: impl std::fmt::Display) -> Self {
        self.source = Some(err.to_string());
        self
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody::new(self.code, self.message.clone())
    }
}

impl std::fmt::Display for HandledError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.code, self.code.as_str(), self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for HandledError {}

impl<'r, 'o: 'r> Responder<'r, 'o> for HandledError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        if self.status.code >= 500 {
            error!(uri = %req.uri(), "{}", self);
        } else {
            debug!(uri = %req.uri(), "{}", self);
        }

        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(self.status)
            .ok()
    }
}
