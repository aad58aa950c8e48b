use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use hearth_dns_domain::DnsError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// DNS over plain TCP with RFC 1035 §4.2.2 framing: every message is
/// preceded by a 2-byte big-endian length.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DnsError> {
        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| self.transport_error(e))?;

        write_framed(&mut stream, message_bytes)
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = read_framed(&mut stream)
            .await
            .map_err(|e| self.transport_error(e))?;

        Ok(TransportResponse {
            bytes: response,
            protocol_used: "TCP",
        })
    }

    fn transport_error(&self, error: std::io::Error) -> DnsError {
        DnsError::UpstreamTransport {
            server: self.server_addr.to_string(),
            detail: error.to_string(),
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
        "TCP"
    }
}

/// Write one length-prefixed DNS message
pub(crate) async fn write_framed<S>(stream: &mut S, message: &[u8]) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = message.len() as u16;
    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message).await?;
    stream.flush().await
}

/// Read one length-prefixed DNS message
pub(crate) async fn read_framed<S>(stream: &mut S) -> std::io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut length_buf = [0u8; 2];
    stream.read_exact(&mut length_buf).await?;
    let length = u16::from_be_bytes(length_buf) as usize;

    let mut response = vec![0u8; length];
    stream.read_exact(&mut response).await?;
    Ok(response)
}
