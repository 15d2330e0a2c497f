use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::{auth::AuthError, session, token, validate::Violation};

/// Body of every REST error response.
#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// REST view of the identity layer's errors.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg,
            Self::Internal => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<Vec<Violation>> for ApiError {
    fn from(violations: Vec<Violation>) -> Self {
        Self::BadRequest(crate::validate::describe(&violations))
    }
}

impl From<session::Error> for ApiError {
    fn from(err: session::Error) -> Self {
        match err {
            session::Error::UserNotFound | session::Error::SessionNotFound => {
                Self::NotFound(err.to_string())
            }
            session::Error::InvalidCredentials | session::Error::SessionRejected(_) => {
                Self::Unauthorized(err.to_string())
            }
            session::Error::UserExists => Self::Conflict(err.to_string()),
            session::Error::Token(
                inner @ (token::Error::InvalidToken | token::Error::ExpiredToken),
            ) => Self::Unauthorized(AuthError::from(inner).to_string()),
            session::Error::Token(_)
            | session::Error::SessionPersistence(_)
            | session::Error::Store(_)
            | session::Error::Hash(_) => {
                error!("Request failed: {err}");
                Self::Internal
            }
        }
    }
}
