//! Mapping of core errors onto user-facing HTTP responses.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

use crate::publications::PublicationError;

/// Errors returned by the HTTP handlers.
///
/// Internal failures are logged and reported without their details.
#[derive(Debug, Display)]
pub enum HTTPError {
    /// 400
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    /// 401
    #[display(fmt = "Authentication required")]
    Unauthorized,
    /// 403
    #[display(fmt = "Forbidden")]
    Forbidden,
    /// 404
    #[display(fmt = "{}", _0)]
    NotFound(String),
    /// 500
    #[display(fmt = "Internal server error")]
    InternalServerError,
}

impl std::error::Error for HTTPError {}

impl ResponseError for HTTPError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<PublicationError> for HTTPError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::NotFound(_)
            | PublicationError::ImageNotFound { .. }
            | PublicationError::ObjectNotFound(_) => Self::NotFound(err.to_string()),
            PublicationError::InvalidReference(_) | PublicationError::InvalidInput(_) => {
                Self::BadRequest(err.to_string())
            }
            PublicationError::InvalidSignature => Self::Forbidden,
            PublicationError::StorageFailure(_) | PublicationError::ObjectStoreFailure(_) => {
                tracing::error!("{err}");
                Self::InternalServerError
            }
        }
    }
}
