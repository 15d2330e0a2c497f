use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::error::{ApiError, ErrorBody},
    session::SessionManager,
    token::TokenPayload,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct BlockSessionResponse {
    pub session_id: Uuid,
    pub is_blocked: bool,
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/block",
    params(("id" = Uuid, Path, description = "Session id")),
    responses (
        (status = 200, description = "Session blocked", body = BlockSessionResponse),
        (status = 400, description = "Invalid session id", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "No such session for this user", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
pub async fn block_session(
    manager: Extension<Arc<SessionManager>>,
    Extension(payload): Extension<TokenPayload>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BlockSessionResponse>, ApiError> {
    let Path(id) = id.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    let session = manager.block_session(id, &payload.username).await?;

    Ok(Json(BlockSessionResponse {
        session_id: session.id,
        is_blocked: session.is_blocked,
    }))
}
