use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Extension},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::{
        client::client_metadata,
        error::{ApiError, ErrorBody},
    },
    session::SessionManager,
    store::PublicUser,
    validate,
};

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginUserResponse {
    pub session_id: Uuid,
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub access_token_expires_at: OffsetDateTime,
    pub refresh_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_token_expires_at: OffsetDateTime,
    pub user: PublicUser,
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginUserRequest,
    responses (
        (status = 200, description = "Tokens issued and session opened", body = LoginUserResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid username or password", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "users"
)]
pub async fn login(
    manager: Extension<Arc<SessionManager>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<LoginUserRequest>, JsonRejection>,
) -> Result<Json<LoginUserResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    let violations = validate::login(&request.username, &request.password);
    if !violations.is_empty() {
        return Err(violations.into());
    }

    let client = client_metadata(&headers, peer.map(|ConnectInfo(addr)| addr));
    let result = manager
        .login(&request.username, &request.password, client)
        .await?;

    Ok(Json(LoginUserResponse {
        session_id: result.session_id,
        access_token: result.access_token,
        access_token_expires_at: result.access_token_expires_at,
        refresh_token: result.refresh_token,
        refresh_token_expires_at: result.refresh_token_expires_at,
        user: result.user,
    }))
}
