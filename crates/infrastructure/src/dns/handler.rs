//! hickory-server request handler.
//!
//! Exactly one response is written per request. Every response this
//! resolver issues carries AA=1; RA mirrors whether recursion is enabled.

use crate::dns::engine::QueryEngine;
use async_trait::async_trait;
use hickory_proto::op::{Header, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::Record;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct DnsHandler {
    engine: Arc<QueryEngine>,
}

impl DnsHandler {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    async fn send_error<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        code: ResponseCode,
    ) -> ResponseInfo {
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.error_msg(request.header(), code);
        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(error) => {
                error!(%error, "failed to send DNS error response");
                serve_failed()
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DnsHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let header = request.header();
        if header.op_code() != OpCode::Query || header.message_type() != MessageType::Query {
            debug!(op_code = ?header.op_code(), src = %request.src(), "refusing non-query request");
            return self
                .send_error(request, response_handle, ResponseCode::Refused)
                .await;
        }

        let query = request.query();
        debug!(
            src = %request.src(),
            name = %query.name(),
            qtype = %query.query_type(),
            "query received"
        );

        let answer = self.engine.answer(query.name(), query.query_type()).await;

        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_recursion_available(self.engine.recursion_enabled());
        header.set_response_code(answer.rcode);

        let response = builder.build(
            header,
            answer.records.as_slice().iter(),
            std::iter::empty::<&Record>(),
            std::iter::empty::<&Record>(),
            std::iter::empty::<&Record>(),
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(error) => {
                // No retransmit; the client will retry on its own schedule
                error!(%error, src = %request.src(), "failed to send DNS response");
                serve_failed()
            }
        }
    }
}

fn serve_failed() -> ResponseInfo {
    let mut header = Header::new();
    header.set_response_code(ResponseCode::ServFail);
    header.into()
}
