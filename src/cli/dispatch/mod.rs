//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, currently only the
//! combined REST + gRPC server.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{token, ARG_DSN, ARG_GRPC_PORT, ARG_HTTP_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let http_port = matches.get_one::<u16>(ARG_HTTP_PORT).copied().unwrap_or(8080);
    let grpc_port = matches.get_one::<u16>(ARG_GRPC_PORT).copied().unwrap_or(9090);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let token_opts = token::Options::parse(matches)?;

    Ok(Action::Server(Args {
        http_port,
        grpc_port,
        dsn,
        token_symmetric_key: token_opts.symmetric_key,
        access_token_ttl_seconds: token_opts.access_token_ttl_seconds,
        refresh_token_ttl_seconds: token_opts.refresh_token_ttl_seconds,
    }))
}
