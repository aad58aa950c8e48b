#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// What a scripted upstream does with each query it receives
#[derive(Clone, Copy)]
pub enum MockBehavior {
    /// Swallow the query so the client times out
    Ignore,
    /// Reply NOERROR with an empty answer section
    EmptyAnswer,
    /// Reply with a single A record pointing at the given address
    AnswerA(Ipv4Addr),
}

/// Scripted mock upstream for failover tests.
///
/// Every received query appends the server's label to the shared attempt
/// log, so tests can assert both the number and the order of upstream
/// attempts.
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(
        label: &'static str,
        behavior: MockBehavior,
        attempts: Arc<Mutex<Vec<&'static str>>>,
    ) -> std::io::Result<(Self, SocketAddr)> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let local_addr = socket.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { break };
                        attempts.lock().unwrap().push(label);
                        if let Some(response) = build_response(&buf[..len], behavior) {
                            let _ = socket.send_to(&response, peer).await;
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                addr: local_addr,
                shutdown_tx: Some(shutdown_tx),
            },
            local_addr,
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn build_response(query_bytes: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
    let query = Message::from_vec(query_bytes).ok()?;

    match behavior {
        MockBehavior::Ignore => None,
        MockBehavior::EmptyAnswer => reply_to(&query).to_vec().ok(),
        MockBehavior::AnswerA(ip) => {
            let name = query.queries().first()?.name().clone();
            let mut response = reply_to(&query);
            response.add_answer(Record::from_rdata(name, 60, RData::A(ip.into())));
            response.to_vec().ok()
        }
    }
}

fn reply_to(query: &Message) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);
    for query in query.queries() {
        response.add_query(query.clone());
    }
    response
}
