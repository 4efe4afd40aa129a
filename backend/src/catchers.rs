use rocket::{Request, catch, serde::json::Json};
use ballotbox_shared::error::{ErrorBody, ErrorCode};

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(ErrorCode::BadRequest, "Invalid request parameters."))
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(
        ErrorCode::Unauthorized,
        "Permission token missing or invalid.",
    ))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(ErrorCode::NotFound, "The requested resource was not found."))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(ErrorCode::BadRequest, "The request could not be processed."))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::new(ErrorCode::InternalError, "An internal server error occurred."))
}
