use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    api::error::{ApiError, ErrorBody},
    session::SessionManager,
    store::PublicUser,
    token::TokenPayload,
    validate,
};

#[derive(ToSchema, Deserialize, Debug)]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses (
        (status = 200, description = "User created", body = PublicUser),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Username or email already exists", body = ErrorBody),
    ),
    tag = "users"
)]
pub async fn create_user(
    manager: Extension<Arc<SessionManager>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    let violations = validate::create_user(
        &request.username,
        &request.full_name,
        &request.email,
        &request.password,
    );
    if !violations.is_empty() {
        return Err(violations.into());
    }

    let user = manager
        .create_user(
            &request.username,
            &request.full_name,
            &request.email,
            &request.password,
        )
        .await?;

    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses (
        (status = 200, description = "The authenticated user", body = PublicUser),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(
    manager: Extension<Arc<SessionManager>>,
    Extension(payload): Extension<TokenPayload>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(manager.get_user(&payload.username).await?))
}
