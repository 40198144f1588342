use axum::http::HeaderMap;
use ipnet::IpNet;
use std::net::IpAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolves the originating address of a request.
///
/// With no trusted proxies configured, `X-Forwarded-For` is honored from
/// any peer. Otherwise only peers inside one of the trusted ranges may set it.
#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    trusted_proxies: Vec<IpNet>,
}

impl ClientIpResolver {
    pub fn new(trusted_proxies: Vec<IpNet>) -> Self {
        Self { trusted_proxies }
    }

    /// Extract the client IP address
    ///
    /// # Arguments
    /// * `headers` - HTTP request headers
    /// * `peer` - The socket remote address, when known
    ///
    /// # Returns
    /// The first `X-Forwarded-For` entry if the header may be trusted,
    /// else the peer address, else `None`. The header value is returned
    /// as written, without checking that it is an IP address.
    pub fn resolve(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> Option<String> {
        if self.trusts(peer) {
            if let Some(forwarded) = first_forwarded_for(headers) {
                return Some(forwarded.to_string());
            }
        }

        peer.map(|ip| ip.to_string())
    }

    fn trusts(&self, peer: Option<IpAddr>) -> bool {
        if self.trusted_proxies.is_empty() {
            return true;
        }

        peer.map(|ip| ip.to_canonical())
            .is_some_and(|ip| self.trusted_proxies.iter().any(|net| net.contains(&ip)))
    }
}

/// First non-empty entry of the `X-Forwarded-For` header.
fn first_forwarded_for(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();

    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_xff(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_first_entry_of_forwarded_chain() {
        let headers = headers_with_xff("203.0.113.5, 70.41.3.18");
        let peer: IpAddr = "10.0.0.2".parse().unwrap();

        let resolver = ClientIpResolver::default();
        assert_eq!(
            resolver.resolve(&headers, Some(peer)).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn test_chain_without_spaces() {
        let headers = headers_with_xff("203.0.113.5,70.41.3.18");
        assert_eq!(first_forwarded_for(&headers), Some("203.0.113.5"));
    }

    #[test]
    fn test_falls_back_to_peer() {
        let peer: IpAddr = "192.168.1.1".parse().unwrap();
        let resolver = ClientIpResolver::default();

        assert_eq!(
            resolver.resolve(&HeaderMap::new(), Some(peer)).as_deref(),
            Some("192.168.1.1")
        );
    }

    #[test]
    fn test_empty_header_falls_back_to_peer() {
        let headers = headers_with_xff("  ");
        let peer: IpAddr = "192.168.1.1".parse().unwrap();

        assert_eq!(
            ClientIpResolver::default().resolve(&headers, Some(peer)).as_deref(),
            Some("192.168.1.1")
        );
    }

    #[test]
    fn test_nothing_known_yields_none() {
        assert_eq!(ClientIpResolver::default().resolve(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_header_value_is_not_validated() {
        let headers = headers_with_xff("unknown, 70.41.3.18");
        assert_eq!(
            ClientIpResolver::default().resolve(&headers, None).as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn test_untrusted_peer_cannot_forward() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().unwrap()]);
        let headers = headers_with_xff("203.0.113.5");
        let peer: IpAddr = "198.51.100.7".parse().unwrap();

        assert_eq!(
            resolver.resolve(&headers, Some(peer)).as_deref(),
            Some("198.51.100.7")
        );
        assert_eq!(resolver.resolve(&headers, None), None);
    }

    #[test]
    fn test_trusted_peer_can_forward() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().unwrap()]);
        let headers = headers_with_xff("203.0.113.5");
        let peer: IpAddr = "10.1.2.3".parse().unwrap();

        assert_eq!(
            resolver.resolve(&headers, Some(peer)).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn test_ipv4_mapped_peer_matches_ipv4_range() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().unwrap()]);
        let headers = headers_with_xff("203.0.113.5");
        let peer: IpAddr = "::ffff:10.1.2.3".parse().unwrap();

        assert_eq!(
            resolver.resolve(&headers, Some(peer)).as_deref(),
            Some("203.0.113.5")
        );
    }
}
