use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use super::errors::ConfigError;

/// Transport protocol for an upstream resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Udp,
    Tcp,
    /// DNS-over-TLS (RFC 7858)
    Tls,
    /// DNS-over-HTTPS (RFC 8484)
    Https,
}

impl Protocol {
    /// Default port when the configuration omits one
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Udp | Protocol::Tcp => 53,
            Protocol::Tls => 853,
            Protocol::Https => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::Tls => "tls",
            Protocol::Https => "https",
        };
        f.write_str(s)
    }
}

/// One upstream resolver endpoint. Order in the configuration is
/// preference order for failover.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamServer {
    /// Optional friendly name used in logs
    #[serde(default)]
    pub name: Option<String>,

    /// Server address. An IP literal for udp/tcp/tls; for https a
    /// hostname is also accepted.
    pub address: String,

    pub protocol: Protocol,

    /// Optional custom port; derived from the protocol when omitted
    #[serde(default)]
    pub port: Option<u16>,

    /// HTTP path for DoH endpoints (default: "/dns-query")
    #[serde(default)]
    pub path: Option<String>,

    /// TLS certificate verification for tls/https; ignored for udp/tcp
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

impl UpstreamServer {
    /// Port to connect to, falling back to the protocol default
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    /// DoH request path, falling back to the RFC 8484 well-known path
    pub fn effective_path(&self) -> &str {
        self.path.as_deref().unwrap_or("/dns-query")
    }

    /// Socket address for datagram/stream transports.
    ///
    /// Fails when `address` is not an IP literal; validation rejects that
    /// combination for udp/tcp/tls before any transport is built.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr =
            self.address
                .parse()
                .map_err(|_| ConfigError::InvalidUpstreamAddress {
                    address: self.address.clone(),
                    protocol: self.protocol,
                })?;
        Ok(SocketAddr::new(ip, self.effective_port()))
    }

    /// Full DoH endpoint URL
    pub fn doh_url(&self) -> String {
        let host = if self.address.contains(':') {
            // IPv6 literal
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        };
        format!(
            "https://{}:{}{}",
            host,
            self.effective_port(),
            self.effective_path()
        )
    }

    /// Name for log lines: the friendly name when set, otherwise the endpoint
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "{}://{}:{}",
                self.protocol,
                self.address,
                self.effective_port()
            ),
        }
    }
}
