use axum::http::HeaderMap;
use tonic::metadata::MetadataMap;

use super::{credential, AuthError, Credential};
use crate::token::{TokenCodec, TokenPayload};

/// Verify an already-extracted credential.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] or [`AuthError::ExpiredToken`].
pub fn authorize(codec: &TokenCodec, credential: &Credential) -> Result<TokenPayload, AuthError> {
    Ok(codec.verify(&credential.token)?)
}

/// Authorize an HTTP request from its headers.
///
/// # Errors
///
/// Returns the extraction error unchanged, otherwise the verification error.
pub fn authorize_headers(
    codec: &TokenCodec,
    headers: &HeaderMap,
) -> Result<TokenPayload, AuthError> {
    let credential = credential::from_headers(headers)?;
    authorize(codec, &credential)
}

/// Authorize a gRPC call from its metadata.
///
/// # Errors
///
/// Returns the extraction error unchanged, otherwise the verification error.
pub fn authorize_metadata(
    codec: &TokenCodec,
    metadata: &MetadataMap,
) -> Result<TokenPayload, AuthError> {
    let credential = credential::from_metadata(metadata)?;
    authorize(codec, &credential)
}
