use tonic::Status;
use tracing::error;

use crate::{auth::AuthError, session, token, validate::Violation};

pub(crate) fn unauthenticated(err: &AuthError) -> Status {
    Status::unauthenticated(format!("unauthorized: {err}"))
}

pub(crate) fn invalid_argument(violations: &[Violation]) -> Status {
    Status::invalid_argument(crate::validate::describe(violations))
}

/// gRPC view of session errors; internal details are logged, not returned.
pub(crate) fn session_status(err: session::Error) -> Status {
    match err {
        session::Error::UserNotFound | session::Error::SessionNotFound => {
            Status::not_found(err.to_string())
        }
        session::Error::InvalidCredentials | session::Error::SessionRejected(_) => {
            Status::unauthenticated(err.to_string())
        }
        session::Error::UserExists => Status::already_exists(err.to_string()),
        session::Error::Token(
            inner @ (token::Error::InvalidToken | token::Error::ExpiredToken),
        ) => unauthenticated(&AuthError::from(inner)),
        session::Error::Token(_)
        | session::Error::SessionPersistence(_)
        | session::Error::Store(_)
        | session::Error::Hash(_) => {
            error!("RPC failed: {err}");
            Status::internal("internal server error")
        }
    }
}
