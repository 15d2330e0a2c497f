//! REST surface.
//!
//! Public routes take credentials in the body; `/users/me` and
//! `/sessions/:id/block` sit behind [`middleware::require_bearer`].

use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::session::SessionManager;

pub mod client;
pub mod error;
pub mod handlers;
pub mod middleware;
mod openapi;

pub use openapi::openapi;

const X_REQUEST_ID: &str = "x-request-id";

/// Build the REST router around a shared [`SessionManager`].
pub fn router(manager: Arc<SessionManager>) -> Router {
    let protected = Router::new()
        .route("/users/me", get(handlers::me))
        .route("/sessions/:id/block", post(handlers::block_session))
        .route_layer(from_fn_with_state(manager.clone(), middleware::require_bearer));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/users", post(handlers::create_user))
        .route("/users/login", post(handlers::login))
        .route("/tokens/renew_access", post(handlers::renew_access_token))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(X_REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    X_REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(manager)),
        )
}

/// Serve the REST router until `shutdown` resolves.
///
/// # Errors
/// Return error if the server fails
pub async fn serve<F>(
    listener: TcpListener,
    manager: Arc<SessionManager>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(manager);

    info!("REST listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
