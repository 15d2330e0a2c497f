use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::{
    api::error::{ApiError, ErrorBody},
    session::SessionManager,
};

#[derive(ToSchema, Deserialize, Debug)]
pub struct RenewAccessTokenRequest {
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RenewAccessTokenResponse {
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub access_token_expires_at: OffsetDateTime,
}

#[utoipa::path(
    post,
    path = "/tokens/renew_access",
    request_body = RenewAccessTokenRequest,
    responses (
        (status = 200, description = "New access token", body = RenewAccessTokenResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Refresh token or session rejected", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody),
    ),
    tag = "tokens"
)]
pub async fn renew_access_token(
    manager: Extension<Arc<SessionManager>>,
    payload: Result<Json<RenewAccessTokenRequest>, JsonRejection>,
) -> Result<Json<RenewAccessTokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    if request.refresh_token.is_empty() {
        return Err(ApiError::BadRequest(
            "refresh_token: must not be empty".to_string(),
        ));
    }

    let renewed = manager.renew_access_token(&request.refresh_token).await?;

    Ok(Json(RenewAccessTokenResponse {
        access_token: renewed.access_token,
        access_token_expires_at: renewed.payload.expired_at,
    }))
}
