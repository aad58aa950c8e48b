//! Upstream DNS transports.
//!
//! One client per configured upstream endpoint, pooled by
//! `(protocol, address, port)` and immutable after creation. Every
//! transport failure collapses into a `DnsError`; callers only distinguish
//! "answered" from "try the next upstream".

pub mod https;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use dashmap::DashMap;
use hearth_dns_domain::{DnsError, Protocol, UpstreamServer};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::Duration;

/// Result of a raw DNS transport exchange
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
    /// Which protocol produced them
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport; avoids a heap allocation and vtable hop on
/// the per-query path.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(t) => t.protocol_name(),
            Self::Tcp(t) => t.protocol_name(),
            Self::Tls(t) => t.protocol_name(),
            Self::Https(t) => t.protocol_name(),
        }
    }
}

/// Default per-exchange timeout for a protocol
pub fn exchange_timeout(protocol: Protocol) -> Duration {
    match protocol {
        Protocol::Udp | Protocol::Tcp => Duration::from_secs(3),
        Protocol::Tls | Protocol::Https => Duration::from_secs(5),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    protocol: Protocol,
    address: Arc<str>,
    port: u16,
}

/// Per-upstream client pool.
///
/// Read-mostly concurrent map with create-on-miss; clients are never
/// replaced once created and live for the process lifetime. Keying by the
/// full `(protocol, address, port)` tuple keeps each TLS client's SNI tied
/// to its own endpoint.
pub struct TransportPool {
    clients: DashMap<PoolKey, Arc<Transport>, FxBuildHasher>,
    http_verified: reqwest::Client,
    http_insecure: reqwest::Client,
}

impl TransportPool {
    pub fn new() -> Result<Self, DnsError> {
        // Idempotent; later calls are a no-op if a process-wide provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        Ok(Self {
            clients: DashMap::with_hasher(FxBuildHasher),
            http_verified: https::build_client(true)?,
            http_insecure: https::build_client(false)?,
        })
    }

    pub fn get_or_create(&self, upstream: &UpstreamServer) -> Result<Arc<Transport>, DnsError> {
        let key = PoolKey {
            protocol: upstream.protocol,
            address: Arc::from(upstream.address.as_str()),
            port: upstream.effective_port(),
        };

        if let Some(existing) = self.clients.get(&key) {
            return Ok(Arc::clone(&existing));
        }

        let transport = Arc::new(self.create(upstream)?);
        let entry = self.clients.entry(key).or_insert(transport);
        Ok(Arc::clone(&entry))
    }

    fn create(&self, upstream: &UpstreamServer) -> Result<Transport, DnsError> {
        let transport = match upstream.protocol {
            Protocol::Udp => Transport::Udp(udp::UdpTransport::new(socket_addr(upstream)?)),
            Protocol::Tcp => Transport::Tcp(tcp::TcpTransport::new(socket_addr(upstream)?)),
            Protocol::Tls => Transport::Tls(tls::TlsTransport::new(
                socket_addr(upstream)?,
                &upstream.address,
                upstream.verify,
            )?),
            Protocol::Https => {
                let client = if upstream.verify {
                    self.http_verified.clone()
                } else {
                    self.http_insecure.clone()
                };
                Transport::Https(https::HttpsTransport::new(upstream.doh_url(), client))
            }
        };
        Ok(transport)
    }
}

fn socket_addr(upstream: &UpstreamServer) -> Result<std::net::SocketAddr, DnsError> {
    upstream
        .socket_addr()
        .map_err(|error| DnsError::UpstreamTransport {
            server: upstream.display_name(),
            detail: error.to_string(),
        })
}
