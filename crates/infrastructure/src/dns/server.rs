//! UDP + TCP listener lifecycle around hickory-server's `ServerFuture`.
//!
//! `bind` doubles as the pre-flight check: failing to acquire either
//! socket is fatal and reported before the serve loop starts, with a
//! dedicated error for privileged ports. The state machine is
//! Created → Listening → Draining → Stopped; Stopped is terminal.

use crate::dns::handler::DnsHandler;
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// How long a TCP client may take per request before the connection is
/// dropped
const TCP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    Draining,
    Stopped,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(
        "cannot bind {addr}: port {} requires elevated privileges (try a port above 1023)",
        .addr.port()
    )]
    PrivilegedPort {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(String),
}

/// Shared handle for observing and stopping a running [`DnsServer`]
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: CancellationToken,
    state_rx: watch::Receiver<ServerState>,
}

impl ServerHandle {
    /// Initiate graceful shutdown: stop accepting new requests and let
    /// in-flight handlers finish. Idempotent.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn state(&self) -> ServerState {
        *self.state_rx.borrow()
    }

    /// Wait until the server reaches `Stopped`
    pub async fn stopped(&mut self) {
        let _ = self
            .state_rx
            .wait_for(|state| *state == ServerState::Stopped)
            .await;
    }
}

pub struct DnsServer {
    server: ServerFuture<DnsHandler>,
    local_addr: SocketAddr,
    state_tx: watch::Sender<ServerState>,
    shutdown: CancellationToken,
}

impl DnsServer {
    /// Bind UDP and TCP on the configured address.
    ///
    /// Both sockets share one port; when the configured port is 0 the TCP
    /// listener reuses whatever ephemeral port UDP was assigned.
    pub async fn bind(
        addr: SocketAddr,
        handler: DnsHandler,
    ) -> Result<(Self, ServerHandle), ServerError> {
        let udp_socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| bind_error(addr, e))?;
        let local_addr = udp_socket
            .local_addr()
            .map_err(|e| bind_error(addr, e))?;
        let tcp_listener = TcpListener::bind(local_addr)
            .await
            .map_err(|e| bind_error(local_addr, e))?;

        info!(addr = %local_addr, "DNS listener bound (UDP + TCP)");

        let mut server = ServerFuture::new(handler);
        server.register_socket(udp_socket);
        server.register_listener(tcp_listener, TCP_REQUEST_TIMEOUT);

        let (state_tx, state_rx) = watch::channel(ServerState::Created);
        let shutdown = CancellationToken::new();
        let handle = ServerHandle {
            shutdown: shutdown.clone(),
            state_rx,
        };

        Ok((
            Self {
                server,
                local_addr,
                state_tx,
                shutdown,
            },
            handle,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the handle's `stop()` or a fatal socket error.
    ///
    /// Returns `Ok(())` on clean shutdown; the terminating error
    /// otherwise.
    pub async fn serve(mut self) -> Result<(), ServerError> {
        self.state_tx.send_replace(ServerState::Listening);
        info!(addr = %self.local_addr, "DNS server ready to accept queries");

        enum Outcome {
            Finished(Result<(), hickory_proto::error::ProtoError>),
            Stopping,
        }

        let outcome = tokio::select! {
            result = self.server.block_until_done() => Outcome::Finished(result),
            _ = self.shutdown.cancelled() => Outcome::Stopping,
        };

        let result = match outcome {
            Outcome::Finished(Ok(())) => Ok(()),
            Outcome::Finished(Err(error)) => Err(ServerError::Serve(error.to_string())),
            Outcome::Stopping => {
                self.state_tx.send_replace(ServerState::Draining);
                info!("draining in-flight requests");
                self.server
                    .shutdown_gracefully()
                    .await
                    .map_err(|e| ServerError::Serve(e.to_string()))
            }
        };

        self.state_tx.send_replace(ServerState::Stopped);
        info!("DNS server stopped");
        result
    }
}

fn bind_error(addr: SocketAddr, source: std::io::Error) -> ServerError {
    if source.kind() == std::io::ErrorKind::PermissionDenied && addr.port() < 1024 {
        ServerError::PrivilegedPort { addr, source }
    } else {
        ServerError::Bind { addr, source }
    }
}
