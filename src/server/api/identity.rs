//! The acting user, as asserted by the authentication layer in front of us.
//!
//! Authentication itself happens upstream; requests reach this service with
//! the authenticated user id and role in headers.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::server::errors::HTTPError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular user.
    User,
    /// Administrator, may act on any resource.
    Admin,
}

impl Role {
    /// Role from its numeric code. `2` is the administrator role.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Admin,
            _ => Self::User,
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Id of the acting user.
    pub user_id: i64,
    /// Role of the acting user.
    pub role: Role,
}

impl Identity {
    /// Whether the caller may act on a resource owned by `owner_id`.
    #[must_use]
    pub fn is_owner_or_admin(&self, owner_id: i64) -> bool {
        self.user_id == owner_id || self.role == Role::Admin
    }

    /// Parse the identity headers of a request.
    ///
    /// # Errors
    /// Errors with `Unauthorized` if the user id header is missing or malformed.
    pub fn from_headers(req: &HttpRequest) -> Result<Self, HTTPError> {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };
        let user_id = header(USER_ID_HEADER)
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or(HTTPError::Unauthorized)?;
        let role = header(USER_ROLE_HEADER)
            .and_then(|value| value.parse::<i64>().ok())
            .map_or(Role::User, Role::from_code);
        Ok(Self { user_id, role })
    }
}

impl FromRequest for Identity {
    type Error = HTTPError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
