use crate::{
    api,
    cli::telemetry,
    gapi,
    password::Argon2Hasher,
    session::{SessionManager, TokenDurations},
    store::postgres::PgStore,
    token::TokenCodec,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{
    future::Future,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{error, info, instrument};

pub struct Args {
    pub http_port: u16,
    pub grpc_port: u16,
    pub dsn: String,
    pub token_symmetric_key: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("http_port", &self.http_port)
            .field("grpc_port", &self.grpc_port)
            .field("token_symmetric_key", &"[REDACTED]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl Args {
    fn durations(&self) -> TokenDurations {
        TokenDurations {
            access: time::Duration::seconds(self.access_token_ttl_seconds),
            refresh: time::Duration::seconds(self.refresh_token_ttl_seconds),
        }
    }
}

/// Run the REST and gRPC servers until Ctrl-C.
///
/// # Errors
/// Returns an error if the token key is invalid, the database is unreachable,
/// or either listener fails.
#[instrument(skip(args))]
pub async fn execute(args: Args) -> Result<()> {
    let codec = TokenCodec::new(args.token_symmetric_key.expose_secret().as_bytes())
        .context("invalid token symmetric key")?;

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("failed to connect to database")?;

    let manager = Arc::new(SessionManager::new(
        Arc::new(codec),
        Arc::new(PgStore::new(pool)),
        Arc::new(Argon2Hasher),
        args.durations(),
    ));

    let listener = TcpListener::bind(format!("::0:{}", args.http_port))
        .await
        .with_context(|| format!("failed to bind REST port {}", args.http_port))?;
    let grpc_addr = SocketAddr::from((Ipv6Addr::UNSPECIFIED, args.grpc_port));

    let (stop_tx, stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {err}");
            return;
        }
        info!("shutdown signal received");
        let _ = stop_tx.send(true);
    });

    let result = tokio::try_join!(
        api::serve(listener, manager.clone(), stopped(stop_rx.clone())),
        gapi::serve(grpc_addr, manager, stopped(stop_rx)),
    );

    telemetry::shutdown_tracer();

    result.map(|_| ())
}

fn stopped(mut rx: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        // Err means the sender is gone, which also ends the server.
        let _ = rx.changed().await;
    }
}
