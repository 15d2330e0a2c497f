use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use crate::{auth, session::SessionManager};

/// Reject requests without a valid bearer access token.
///
/// On success the verified [`TokenPayload`](crate::token::TokenPayload) is
/// stored in the request extensions for the handler.
pub async fn require_bearer(
    State(manager): State<Arc<SessionManager>>,
    mut request: Request,
    next: Next,
) -> Response {
    match auth::authorize_headers(manager.codec(), request.headers()) {
        Ok(payload) => {
            request.extensions_mut().insert(payload);
            next.run(request).await
        }
        Err(err) => {
            debug!("Rejected request: {err}");
            ApiError::from(err).into_response()
        }
    }
}
