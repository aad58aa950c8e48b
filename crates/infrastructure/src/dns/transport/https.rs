use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use hearth_dns_domain::DnsError;
use std::time::Duration;
use tracing::debug;

/// Expected content type for DNS-over-HTTPS exchanges (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// Product string sent with every DoH request
const USER_AGENT: &str = concat!("hearth-dns/", env!("CARGO_PKG_VERSION"));

/// Build one of the two process-wide DoH clients.
///
/// All verified DoH upstreams share a single pooled client; upstreams with
/// `verify = false` share a second one, so certificate validation stays a
/// per-upstream decision while connections stay keep-alive pooled.
pub(crate) fn build_client(verify: bool) -> Result<reqwest::Client, DnsError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .user_agent(USER_AGENT)
        .pool_idle_timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(5));
    if !verify {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder.build().map_err(|e| DnsError::UpstreamTransport {
        server: "https".to_string(),
        detail: format!("failed to build HTTP client: {e}"),
    })
}

/// DNS-over-HTTPS transport (RFC 8484): POST with the wire-format query as
/// the request body.
pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpsTransport {
    pub fn new(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DnsError> {
        debug!(url = %self.url, message_len = message_bytes.len(), "sending DoH query");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
            .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
            .body(message_bytes.to_vec())
            .send()
            .await
            .map_err(|e| DnsError::UpstreamTransport {
                server: self.url.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DnsError::UpstreamHttpStatus {
                server: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DnsError::UpstreamTransport {
                server: self.url.clone(),
                detail: format!("failed to read DoH response body: {e}"),
            })?;

        debug!(url = %self.url, response_len = body.len(), "DoH response received");

        Ok(TransportResponse {
            bytes: body.to_vec(),
            protocol_used: "HTTPS",
        })
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DnsError::UpstreamTimeout {
                server: self.url.clone(),
            })?
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
