use std::net::SocketAddr;
use tonic::metadata::MetadataMap;

use crate::{api::client::first_hop, session::ClientMetadata};

const GATEWAY_USER_AGENT: &str = "grpcgateway-user-agent";
const USER_AGENT: &str = "user-agent";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

fn first_value<'a>(metadata: &'a MetadataMap, key: &str) -> Option<&'a str> {
    metadata
        .get_all(key)
        .iter()
        .next()
        .and_then(|value| value.to_str().ok())
}

/// Client details for a new session from call metadata.
///
/// A gateway-forwarded user agent wins over the caller's own; the first
/// `x-forwarded-for` hop wins over the peer address.
#[must_use]
pub fn extract(metadata: &MetadataMap, peer: Option<SocketAddr>) -> ClientMetadata {
    let user_agent = first_value(metadata, GATEWAY_USER_AGENT)
        .or_else(|| first_value(metadata, USER_AGENT))
        .unwrap_or_default()
        .to_string();

    let client_ip = first_value(metadata, X_FORWARDED_FOR)
        .and_then(first_hop)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    ClientMetadata {
        user_agent,
        client_ip,
    }
}
