//! Request identity.
//!
//! Authentication happens upstream. The gateway in front of this server puts the id of the logged-in user in the
//! `X-Authenticated-User` header, and every user-scoped route extracts it with [`AuthenticatedUser`].
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use log::*;

use crate::errors::ServerError;

pub const USER_HEADER: &str = "X-Authenticated-User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_headers(req.headers()))
    }
}

fn user_from_headers(headers: &HeaderMap) -> Result<AuthenticatedUser, ServerError> {
    let value = headers
        .get(USER_HEADER)
        .ok_or_else(|| ServerError::Unauthenticated(format!("The {USER_HEADER} header is missing")))?;
    let value = value.to_str().map_err(|e| {
        debug!("💻️ Could not read the {USER_HEADER} header. {e}");
        ServerError::Unauthenticated(format!("The {USER_HEADER} header is not readable"))
    })?;
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(AuthenticatedUser(id)),
        _ => {
            debug!("💻️ Rejecting request with {USER_HEADER}: {value}");
            Err(ServerError::Unauthenticated(format!("'{value}' is not a valid user id")))
        },
    }
}

#[cfg(test)]
mod test {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(HeaderName::from_static("x-authenticated-user"), HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn reads_the_user_id() {
        assert_eq!(user_from_headers(&headers("42")).unwrap(), AuthenticatedUser(42));
        assert_eq!(user_from_headers(&headers(" 7 ")).unwrap().id(), 7);
    }

    #[test]
    fn rejects_missing_or_bad_ids() {
        assert!(user_from_headers(&HeaderMap::new()).is_err());
        assert!(user_from_headers(&headers("alice")).is_err());
        assert!(user_from_headers(&headers("0")).is_err());
        assert!(user_from_headers(&headers("-4")).is_err());
    }
}
