//! Construction of upstream DNS queries in wire format.

use hearth_dns_domain::DnsError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a single-question recursive query and serialize it.
    ///
    /// Returns the transaction id alongside the wire bytes so the caller
    /// can match the upstream's response to this query.
    pub fn build_query(name: &Name, record_type: RecordType) -> Result<(u16, Vec<u8>), DnsError> {
        let mut query = Query::new();
        query.set_name(name.clone());
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(query);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DnsError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| DnsError::InvalidName(format!("failed to serialize DNS query: {e}")))?;
        Ok(buf)
    }
}
