use axum::http::{header::USER_AGENT, HeaderMap};
use std::net::SocketAddr;

use crate::session::ClientMetadata;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client details for a new session: `user-agent`, the first
/// `x-forwarded-for` hop, else the peer address.
#[must_use]
pub fn client_metadata(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientMetadata {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let client_ip = headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(first_hop)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    ClientMetadata {
        user_agent,
        client_ip,
    }
}

pub(crate) fn first_hop(forwarded: &str) -> Option<String> {
    forwarded
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_string)
}
