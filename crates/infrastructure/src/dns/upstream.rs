//! Ordered failover across configured upstream resolvers.

use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::transport::{exchange_timeout, TransportPool};
use async_trait::async_trait;
use hearth_dns_domain::{DnsError, UpstreamServer};
use hickory_proto::rr::{Name, Record, RecordType};
use std::time::Duration;
use tracing::{debug, warn};

/// Seam between the query engine and the network.
///
/// `forward` returns the first upstream's answer records, or `None` when
/// every configured upstream failed or answered empty.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(&self, name: &Name, qtype: RecordType) -> Option<Vec<Record>>;
}

/// The production forwarder: tries each upstream in configuration order.
///
/// An attempt counts as failed on transport error, timeout, unparseable
/// response, non-OK HTTP status, or a valid response with zero answer
/// records — the last so that an upstream answering NOERROR-empty where
/// it should answer NXDOMAIN does not mask the rest of the list. Response
/// codes are never inspected for failover decisions.
pub struct UpstreamResolver {
    upstreams: Vec<UpstreamServer>,
    pool: TransportPool,
    timeout_override: Option<Duration>,
}

impl UpstreamResolver {
    pub fn new(upstreams: Vec<UpstreamServer>) -> Result<Self, DnsError> {
        Ok(Self {
            upstreams,
            pool: TransportPool::new()?,
            timeout_override: None,
        })
    }

    /// Replace the per-protocol exchange timeouts with a fixed value.
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    async fn try_upstream(
        &self,
        upstream: &UpstreamServer,
        name: &Name,
        qtype: RecordType,
    ) -> Result<Vec<Record>, DnsError> {
        let (id, query_bytes) = MessageBuilder::build_query(name, qtype)?;
        let transport = self.pool.get_or_create(upstream)?;
        let timeout = self
            .timeout_override
            .unwrap_or_else(|| exchange_timeout(upstream.protocol));

        let response = transport.send(&query_bytes, timeout).await?;
        let mut message = ResponseParser::parse(&response.bytes, id, &upstream.display_name())?;
        Ok(message.take_answers())
    }
}

#[async_trait]
impl Forwarder for UpstreamResolver {
    async fn forward(&self, name: &Name, qtype: RecordType) -> Option<Vec<Record>> {
        for upstream in &self.upstreams {
            let server = upstream.display_name();
            match self.try_upstream(upstream, name, qtype).await {
                Ok(answers) if !answers.is_empty() => {
                    debug!(%server, %name, answers = answers.len(), "upstream resolved");
                    return Some(answers);
                }
                Ok(_) => {
                    debug!(%server, %name, "upstream answered empty, trying next");
                }
                Err(error) => {
                    warn!(%server, %name, %error, "upstream failed, trying next");
                }
            }
        }
        None
    }
}
