//! Client address extraction for audit provenance.
//!
//! The X-Forwarded-For chain is attacker-influenced: only the last
//! `trusted_proxy_count` hops were appended by infrastructure we control.
//! The resolved address feeds provenance metadata only, never authorization.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Peer socket address, present when the server was started with connect
/// info (absent under some test harnesses).
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0),
        ))
    }
}

/// Resolve the client address: X-Forwarded-For first, then X-Real-IP, then
/// the peer socket. Returns "unknown" when nothing usable is present.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    let from_chain = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|chain| client_from_forwarded_chain(chain, trusted_proxy_count));
    if let Some(ip) = from_chain {
        return ip.to_string();
    }

    let from_real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());
    if let Some(ip) = from_real_ip {
        return ip.to_string();
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Pick the client hop out of an X-Forwarded-For chain.
///
/// The chain reads `client, proxy1, proxy2, ...` and the last
/// `trusted_proxy_count` entries came from our own infrastructure. With no
/// trusted proxies the whole header is unverifiable, so the entry closest to
/// us is used.
fn client_from_forwarded_chain(chain: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let hops: Vec<&str> = chain
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let pos = hops.len().saturating_sub(trusted_proxy_count + 1);
    hops.get(pos)?.parse().ok()
}
