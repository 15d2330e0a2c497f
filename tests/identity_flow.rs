//! Cross-transport flow over one in-memory store.
//!
//! Tokens minted through REST must be accepted over gRPC and vice versa,
//! and a session blocked on one surface must stop renewal on the other.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use simplebank::{
    api,
    gapi::{pb, pb::simple_bank_server::SimpleBank, SimpleBankService},
    password::Argon2Hasher,
    session::{SessionManager, TokenDurations},
    store::memory::MemoryStore,
    token::TokenCodec,
};
use std::sync::Arc;
use tonic::{metadata::MetadataValue, Code};
use tower::ServiceExt;

const KEY: &[u8; 32] = b"integration-key-0123456789abcdef";

fn setup() -> Result<(Router, SimpleBankService, Arc<MemoryStore>)> {
    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(SessionManager::new(
        Arc::new(TokenCodec::new(KEY)?),
        store.clone(),
        Arc::new(Argon2Hasher),
        TokenDurations::default(),
    ));
    Ok((
        api::router(manager.clone()),
        SimpleBankService::new(manager),
        store,
    ))
}

async fn call(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response: Response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("User-Agent", "integration/1.0")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn with_bearer<T>(message: T, token: &str) -> Result<tonic::Request<T>> {
    let mut request = tonic::Request::new(message);
    request.metadata_mut().insert(
        "authorization",
        MetadataValue::try_from(format!("Bearer {token}"))?,
    );
    Ok(request)
}

#[tokio::test]
async fn rest_login_then_grpc_block() -> Result<()> {
    let (app, grpc, store) = setup()?;

    let (status, _) = call(
        &app,
        post_json(
            "/users",
            &json!({
                "username": "carol",
                "full_name": "Carol Smith",
                "email": "carol@example.com",
                "password": "carol-password"
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, login) = call(
        &app,
        post_json(
            "/users/login",
            &json!({"username": "carol", "password": "carol-password"}),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.session_count().await, 1);

    let access_token = login["access_token"].as_str().unwrap_or_default().to_string();
    let refresh_token = login["refresh_token"].as_str().unwrap_or_default().to_string();
    let session_id = login["session_id"].as_str().unwrap_or_default().to_string();

    // REST access token works on gRPC
    let user = grpc
        .get_user(with_bearer(
            pb::GetUserRequest {
                username: "carol".to_string(),
            },
            &access_token,
        )?)
        .await?
        .into_inner()
        .user;
    assert_eq!(user.map(|u| u.email), Some("carol@example.com".to_string()));

    let blocked = grpc
        .block_session(with_bearer(
            pb::BlockSessionRequest {
                session_id: session_id.clone(),
            },
            &access_token,
        )?)
        .await?
        .into_inner();
    assert_eq!(blocked.session_id, session_id);
    assert!(blocked.is_blocked);

    let (status, body) = call(
        &app,
        post_json(
            "/tokens/renew_access",
            &json!({ "refresh_token": refresh_token }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "session rejected: blocked session");

    Ok(())
}

#[tokio::test]
async fn grpc_login_then_rest_renew() -> Result<()> {
    let (app, grpc, _store) = setup()?;

    grpc.create_user(tonic::Request::new(pb::CreateUserRequest {
        username: "dave".to_string(),
        full_name: "Dave Jones".to_string(),
        email: "dave@example.com".to_string(),
        password: "dave-password".to_string(),
    }))
    .await?;

    let login = grpc
        .login_user(tonic::Request::new(pb::LoginUserRequest {
            username: "dave".to_string(),
            password: "dave-password".to_string(),
        }))
        .await?
        .into_inner();

    let (status, renewed) = call(
        &app,
        post_json(
            "/tokens/renew_access",
            &json!({ "refresh_token": login.refresh_token }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let access_token = renewed["access_token"].as_str().unwrap_or_default();
    assert!(access_token.starts_with("v4.local."));

    let (status, me) = call(
        &app,
        Request::builder()
            .uri("/users/me")
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "dave");
    assert!(me.get("hashed_password").is_none());

    Ok(())
}

#[tokio::test]
async fn foreign_key_tokens_rejected_everywhere() -> Result<()> {
    let (app, grpc, _store) = setup()?;
    let other = TokenCodec::new(b"another-key-0123456789abcdef0123")?;
    let (token, _) = other.create("erin", time::Duration::minutes(5))?;

    let (status, body) = call(
        &app,
        Request::builder()
            .uri("/users/me")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let status = grpc
        .get_user(with_bearer(
            pb::GetUserRequest {
                username: "erin".to_string(),
            },
            &token,
        )?)
        .await
        .map(|_| ())
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    Ok(())
}
