use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpRequest};

use crate::errors::AppError;

/// Set by the API gateway once it has validated the caller's token.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Extractor for the caller's user id.
///
/// The header is trusted as-is; no token is checked here. The server must
/// only be reachable through the gateway that sets `X-User-Id`, which must
/// also strip any value a client sends itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing user id".to_string()))
            .and_then(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::Unauthorized("Invalid user id".to_string()))
            });

        ready(user_id.map(AuthenticatedUser))
    }
}
