use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use hearth_dns_domain::DnsError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over plain UDP.
///
/// Each exchange binds a fresh ephemeral socket so concurrent queries
/// never contend for one port and stray responses cannot cross requests.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DnsError> {
        let bind_addr = match self.server_addr.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.transport_error(e))?;

        socket
            .send_to(message_bytes, self.server_addr)
            .await
            .map_err(|e| self.transport_error(e))?;

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (len, from_addr) = socket
                .recv_from(&mut recv_buf)
                .await
                .map_err(|e| self.transport_error(e))?;

            if from_addr != self.server_addr {
                debug!(
                    expected = %self.server_addr,
                    received = %from_addr,
                    "ignoring datagram from unexpected source"
                );
                continue;
            }

            return Ok(TransportResponse {
                bytes: recv_buf[..len].to_vec(),
                protocol_used: "UDP",
            });
        }
    }

    fn transport_error(&self, error: std::io::Error) -> DnsError {
        DnsError::UpstreamTransport {
            server: self.server_addr.to_string(),
            detail: error.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DnsError::UpstreamTimeout {
                server: self.server_addr.to_string(),
            })?
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
