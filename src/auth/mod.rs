//! Request authorization shared by the REST and gRPC surfaces.
//!
//! Flow: pull a bearer [`Credential`] out of the transport carrier, verify it
//! with the [`TokenCodec`](crate::token::TokenCodec), and hand the
//! [`TokenPayload`](crate::token::TokenPayload) to the caller. Nothing here
//! touches session storage.

pub mod credential;
mod gate;

pub use credential::Credential;
pub use gate::{authorize, authorize_headers, authorize_metadata};

use thiserror::Error;

use crate::token;

/// Every way a request can fail authorization, regardless of transport.
///
/// Transports map these to their own status vocabulary (401 vs
/// `UNAUTHENTICATED`); messages are safe to return to clients.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is not provided")]
    MissingCredential,
    #[error("invalid authorization header format")]
    MalformedCredential,
    #[error("unsupported authorization type {0}")]
    UnsupportedScheme(String),
    #[error("token is invalid")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
}

impl From<token::Error> for AuthError {
    fn from(err: token::Error) -> Self {
        match err {
            token::Error::ExpiredToken => Self::ExpiredToken,
            // A codec that could not be built never reaches a request, and
            // `Encode` only happens on creation.
            token::Error::InvalidToken
            | token::Error::KeyConfiguration { .. }
            | token::Error::Encode(_) => Self::InvalidToken,
        }
    }
}
