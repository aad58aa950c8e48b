//! Decoding of upstream DNS responses.

use hearth_dns_domain::DnsError;
use hickory_proto::op::Message;

pub struct ResponseParser;

impl ResponseParser {
    /// Decode an upstream response and verify it answers our query.
    ///
    /// A transaction id mismatch is treated like any other unparseable
    /// response: the upstream attempt failed and the caller moves on.
    pub fn parse(bytes: &[u8], expected_id: u16, server: &str) -> Result<Message, DnsError> {
        let message = Message::from_vec(bytes).map_err(|e| DnsError::UpstreamParse {
            server: server.to_string(),
            detail: e.to_string(),
        })?;

        if message.id() != expected_id {
            return Err(DnsError::UpstreamParse {
                server: server.to_string(),
                detail: format!(
                    "transaction id mismatch: expected {expected_id}, got {}",
                    message.id()
                ),
            });
        }

        Ok(message)
    }
}
