//! # SimpleBank identity layer
//!
//! Issues and verifies bearer tokens for a backend exposed over both REST and
//! gRPC, and manages the refresh sessions that back short-lived access
//! tokens.
//!
//! ## Tokens
//!
//! Tokens are PASETO `v4.local` (symmetric authenticated encryption) under a
//! single 32-byte key loaded at startup. A key of any other length aborts
//! startup. Access tokens are short-lived; refresh tokens carry an id that
//! keys a persisted session.
//!
//! ## Authorization
//!
//! Both transports read the `authorization` carrier (`Bearer <token>`) into
//! the same [`auth::Credential`] and share one verification path. Failures
//! map to `401` on REST and `UNAUTHENTICATED` on gRPC.
//!
//! ## Sessions
//!
//! One session row per successful login. Renewal re-checks the session
//! (blocked, expired, owner, token) on every call; blocking is a single
//! conditional update.

pub mod api;
pub mod auth;
pub mod cli;
pub mod gapi;
pub mod password;
pub mod session;
pub mod store;
pub mod token;
pub mod validate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
