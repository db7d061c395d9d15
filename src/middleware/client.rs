use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, Extensions, HeaderMap, Request},
};

use crate::state::AppState;

/// Request origin recorded on contact-form submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = peer_addr(&parts.extensions);
        Ok(ClientInfo {
            ip: resolve_ip(&parts.headers, peer, state.config.api.trust_proxy),
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        })
    }
}

/// Client address for any request. Forwarding headers are only read when
/// `trust_proxy` is set; otherwise the socket peer is the client.
pub fn client_ip<B>(req: &Request<B>, trust_proxy: bool) -> Option<String> {
    resolve_ip(req.headers(), peer_addr(req.extensions()), trust_proxy)
}

fn peer_addr(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0)
}

fn resolve_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = real_ip {
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.3"));
        headers
    }

    #[test]
    fn forwarded_header_wins_behind_trusted_proxy() {
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(resolve_ip(&forwarded(), Some(peer), true).as_deref(), Some("203.0.113.7"));

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.3"));
        assert_eq!(resolve_ip(&headers, Some(peer), true).as_deref(), Some("198.51.100.3"));
    }

    #[test]
    fn forwarding_headers_ignored_by_default() {
        let peer: SocketAddr = "192.0.2.10:5000".parse().unwrap();
        assert_eq!(resolve_ip(&forwarded(), Some(peer), false).as_deref(), Some("192.0.2.10"));
        assert_eq!(resolve_ip(&forwarded(), None, false), None);
    }

    #[test]
    fn falls_back_to_peer() {
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(resolve_ip(&HeaderMap::new(), Some(peer), true).as_deref(), Some("127.0.0.1"));
        assert_eq!(resolve_ip(&HeaderMap::new(), None, true), None);
    }
}
