//! Client identity extraction.
//!
//! The rate limiter and the ip-hash strategy are handed a resolved
//! identity string; this is the only place that derives it. Precedence:
//! explicit `x-real-ip`, else the first hop of `x-forwarded-for`, else the
//! raw peer address.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Resolve the client identity for a request.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        let trimmed = real_ip.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        // Multiple hops are comma separated; the first entry is the client.
        if let Some(first) = forwarded.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    peer.ip().to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "198.51.100.9:45123".parse().unwrap()
    }

    #[test]
    fn prefers_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.4"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.1.1.1, 10.2.2.2"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.4");
    }

    #[test]
    fn falls_back_to_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 10.1.1.1 , 10.2.2.2"),
        );
        assert_eq!(client_ip(&headers, peer()), "10.1.1.1");
    }

    #[test]
    fn falls_back_to_peer_address() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "198.51.100.9");
    }

    #[test]
    fn empty_headers_do_not_shadow_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("  "));
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers, peer()), "198.51.100.9");
    }
}
