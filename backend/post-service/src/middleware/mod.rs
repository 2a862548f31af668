/// HTTP request extractors for post-service
///
/// The acting user is identified by the `X-User-ID` header. There is no
/// authentication layer; the header is trusted as sent.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// Acting user taken from the `X-User-ID` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl UserId {
    fn from_header(req: &HttpRequest) -> Result<Self, AppError> {
        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .filter(|id| !id.is_nil())
            .map(UserId)
            .ok_or_else(|| AppError::BadRequest(format!("{} header is required.", USER_ID_HEADER)))
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_header(req))
    }
}
