//! Location of the note-taking gateway the embedded content talks to.

use futures_util::SinkExt;
use http::uri::{Scheme, Uri};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::{Duration, Instant};

use crate::error::LauncherError;

pub const DEFAULT_GATEWAY_URL: &str = "ws://localhost:3001";

/// A WebSocket gateway address. The HTTP address is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEndpoint {
    uri: Uri,
    secure: bool,
}

impl GatewayEndpoint {
    /// Accepts `ws://`, `wss://`, `http://`, `https://` or a bare `host:port`
    /// (which is taken as `ws://`).
    pub fn parse(raw: &str) -> Result<Self, LauncherError> {
        let trimmed = raw.trim();
        let invalid = |reason: String| LauncherError::InvalidGatewayUrl {
            url: raw.to_string(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(invalid("gateway URL is empty".to_string()));
        }

        let (secure, rest) = if let Some(rest) = strip_scheme(trimmed, "wss") {
            (true, rest)
        } else if let Some(rest) = strip_scheme(trimmed, "ws") {
            (false, rest)
        } else if let Some(rest) = strip_scheme(trimmed, "https") {
            (true, rest)
        } else if let Some(rest) = strip_scheme(trimmed, "http") {
            (false, rest)
        } else if scheme_of(trimmed).is_some() {
            return Err(invalid("unsupported scheme".to_string()));
        } else {
            (false, trimmed)
        };

        let scheme = if secure { "wss" } else { "ws" };
        let uri: Uri = format!("{scheme}://{rest}")
            .parse()
            .map_err(|error| invalid(format!("{error}")))?;
        if uri.host().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if let Some(port) = port_text(&uri) {
            if port.parse::<u16>().is_err() {
                return Err(invalid(format!("invalid port `{port}`")));
            }
        }

        Ok(Self { uri, secure })
    }

    pub fn ws_url(&self) -> String {
        self.uri.to_string()
    }

    pub fn http_url(&self) -> String {
        let scheme = if self.secure {
            Scheme::HTTPS
        } else {
            Scheme::HTTP
        };
        let mut parts = self.uri.clone().into_parts();
        parts.scheme = Some(scheme);
        Uri::from_parts(parts)
            .map(|uri| uri.to_string())
            .unwrap_or_else(|_| self.ws_url())
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn host(&self) -> &str {
        let host = self.uri.host().unwrap_or_default();
        host.trim_start_matches('[').trim_end_matches(']')
    }

    pub fn is_loopback(&self) -> bool {
        let host = self.host().to_ascii_lowercase();
        if host == "localhost" || host.ends_with(".localhost") {
            return true;
        }
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => ip.is_loopback(),
            Ok(IpAddr::V6(ip)) => {
                ip.is_loopback() || ip.to_ipv4_mapped().is_some_and(|ip| ip.is_loopback())
            }
            Err(_) => false,
        }
    }

    /// Loopback, private LAN, link-local, `localhost` or an mDNS `.local` name.
    pub fn is_local(&self) -> bool {
        let host = self.host().to_ascii_lowercase();
        if host == "localhost" || host.ends_with(".localhost") || host.ends_with(".local") {
            return true;
        }
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => is_local_v4(ip),
            Ok(IpAddr::V6(ip)) => is_local_v6(ip),
            Err(_) => false,
        }
    }
}

/// Splits off a leading `scheme://`. A `://` after the first `/`, `?` or `#`
/// belongs to the path or query, not the scheme.
fn scheme_of(url: &str) -> Option<(&str, &str)> {
    let (head, rest) = url.split_once("://")?;
    if head.is_empty() || head.contains(['/', '?', '#']) {
        return None;
    }
    Some((head, rest))
}

fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    let (head, rest) = scheme_of(url)?;
    head.eq_ignore_ascii_case(scheme).then_some(rest)
}

/// The raw text after the authority's port colon. `Uri::port` drops values
/// that do not fit a `u16`, so it cannot tell "no port" from "bad port".
fn port_text(uri: &Uri) -> Option<&str> {
    let (_, port) = uri.authority()?.as_str().rsplit_once(':')?;
    (!port.contains(']')).then_some(port)
}

fn is_local_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local()
}

fn is_local_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_local_v4(mapped);
    }
    let first = ip.segments()[0];
    // fc00::/7 unique local, fe80::/10 link-local
    ip.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProbe {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

/// Opens a WebSocket to the gateway and closes it again.
pub async fn probe(endpoint: &GatewayEndpoint, timeout: Duration) -> GatewayProbe {
    let started = Instant::now();
    let connect = tokio_tungstenite::connect_async(endpoint.ws_url());
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok((mut stream, _response))) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            if let Err(error) = SinkExt::close(&mut stream).await {
                log::debug!("Closing gateway probe connection failed: {error}");
            }
            GatewayProbe {
                reachable: true,
                latency_ms: Some(latency_ms),
                error: None,
            }
        }
        Ok(Err(error)) => GatewayProbe {
            reachable: false,
            latency_ms: None,
            error: Some(format!("Failed to connect to gateway: {error}")),
        },
        Err(_) => GatewayProbe {
            reachable: false,
            latency_ms: None,
            error: Some(format!(
                "Gateway did not answer within {} ms",
                timeout.as_millis()
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_port_becomes_ws() {
        let endpoint = GatewayEndpoint::parse(" 192.168.1.20:3001 ").unwrap();
        assert_eq!(endpoint.ws_url(), "ws://192.168.1.20:3001/");
        assert_eq!(endpoint.http_url(), "http://192.168.1.20:3001/");
        assert!(!endpoint.is_secure());
    }

    #[test]
    fn secure_scheme_maps_to_https() {
        let endpoint = GatewayEndpoint::parse("wss://notes.example.com/ws").unwrap();
        assert_eq!(endpoint.http_url(), "https://notes.example.com/ws");
        assert!(endpoint.is_secure());
        assert!(!endpoint.is_local());
    }

    #[test]
    fn http_input_is_accepted() {
        let endpoint = GatewayEndpoint::parse("http://localhost:3001").unwrap();
        assert_eq!(endpoint.ws_url(), "ws://localhost:3001/");
    }

    #[test]
    fn rejects_empty_and_foreign_schemes() {
        assert!(GatewayEndpoint::parse("   ").is_err());
        assert!(GatewayEndpoint::parse("ftp://localhost:21").is_err());
        assert!(GatewayEndpoint::parse("ws://").is_err());
    }

    #[test]
    fn scheme_like_text_in_the_query_is_not_a_scheme() {
        let endpoint = GatewayEndpoint::parse("localhost:3001/cb?to=http://x").unwrap();
        assert_eq!(endpoint.ws_url(), "ws://localhost:3001/cb?to=http://x");
        assert!(GatewayEndpoint::parse("ws://localhost:3001/cb?to=ftp://x").is_ok());
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(matches!(
            GatewayEndpoint::parse("ws://host:99999"),
            Err(LauncherError::InvalidGatewayUrl { .. })
        ));
        assert!(GatewayEndpoint::parse("host:65535").is_ok());
    }

    #[test]
    fn loopback_is_narrower_than_local() {
        let loopback = GatewayEndpoint::parse("ws://127.0.0.1:3001").unwrap();
        let lan = GatewayEndpoint::parse("ws://192.168.0.9:3001").unwrap();
        assert!(loopback.is_loopback() && loopback.is_local());
        assert!(!lan.is_loopback() && lan.is_local());
    }

    #[test]
    fn classifies_local_hosts() {
        for url in [
            DEFAULT_GATEWAY_URL,
            "ws://127.0.0.1:3001",
            "ws://10.0.0.4:3001",
            "ws://172.20.1.1:3001",
            "ws://192.168.0.9:3001",
            "ws://169.254.3.3:3001",
            "ws://[::1]:3001",
            "ws://[fd12::1]:3001",
            "ws://studio.local:3001",
        ] {
            assert!(GatewayEndpoint::parse(url).unwrap().is_local(), "{url}");
        }
        for url in ["ws://8.8.8.8:3001", "ws://172.32.0.1", "ws://example.com"] {
            assert!(!GatewayEndpoint::parse(url).unwrap().is_local(), "{url}");
        }
    }
}
