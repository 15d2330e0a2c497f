//! gRPC surface (`simplebank.SimpleBank`).
//!
//! Shares the [`SessionManager`] and the bearer parser with the REST
//! surface; only the status vocabulary differs.

use anyhow::Result;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tonic::{metadata::MetadataMap, transport::Server, Status};
use tracing::{debug, info};

use crate::{auth, session::SessionManager, token::TokenPayload};

mod convert;
mod error;
pub mod metadata;
mod rpc;

#[allow(
    clippy::doc_markdown,
    clippy::derive_partial_eq_without_eq,
    clippy::pedantic,
    missing_docs
)]
pub mod pb {
    tonic::include_proto!("simplebank");
}

pub use pb::simple_bank_server::SimpleBankServer;

#[derive(Clone, Debug)]
pub struct SimpleBankService {
    manager: Arc<SessionManager>,
}

impl SimpleBankService {
    #[must_use]
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Verify the bearer token carried in call metadata.
    fn authorize_user(&self, metadata: &MetadataMap) -> Result<TokenPayload, Status> {
        auth::authorize_metadata(self.manager.codec(), metadata).map_err(|err| {
            debug!("Rejected call: {err}");
            error::unauthenticated(&err)
        })
    }
}

/// Serve the gRPC service on `addr` until `shutdown` resolves.
///
/// # Errors
/// Return error if the transport fails
pub async fn serve<F>(
    addr: SocketAddr,
    manager: Arc<SessionManager>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    info!("gRPC listening on {addr}");

    Server::builder()
        .trace_fn(|request| {
            tracing::info_span!("grpc.request", grpc.path = %request.uri().path())
        })
        .add_service(SimpleBankServer::new(SimpleBankService::new(manager)))
        .serve_with_shutdown(addr, shutdown)
        .await?;

    Ok(())
}
