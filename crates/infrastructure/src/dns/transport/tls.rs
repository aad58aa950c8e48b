use super::tcp::{read_framed, write_framed};
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use hearth_dns_domain::DnsError;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// DNS-over-TLS (RFC 7858).
///
/// The TLS client configuration is built once per upstream: SNI is the
/// configured address, trust anchors come from the webpki root store, and
/// rustls negotiates TLS 1.2 or newer. Messages use the same 2-byte
/// length framing as plain TCP.
pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: ServerName<'static>,
    connector: TlsConnector,
}

impl TlsTransport {
    pub fn new(server_addr: SocketAddr, sni: &str, verify: bool) -> Result<Self, DnsError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let mut config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        if !verify {
            config
                .dangerous()
                .set_certificate_verifier(Arc::new(danger::NoVerify));
        }

        let server_name =
            ServerName::try_from(sni.to_string()).map_err(|e| DnsError::UpstreamTransport {
                server: server_addr.to_string(),
                detail: format!("invalid TLS server name '{sni}': {e}"),
            })?;

        Ok(Self {
            server_addr,
            server_name,
            connector: TlsConnector::from(Arc::new(config)),
        })
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<TransportResponse, DnsError> {
        let tcp_stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| self.transport_error(e.to_string()))?;

        let mut tls_stream = self
            .connector
            .connect(self.server_name.clone(), tcp_stream)
            .await
            .map_err(|e| self.transport_error(format!("TLS handshake failed: {e}")))?;

        write_framed(&mut tls_stream, message_bytes)
            .await
            .map_err(|e| self.transport_error(e.to_string()))?;

        let response = read_framed(&mut tls_stream)
            .await
            .map_err(|e| self.transport_error(e.to_string()))?;

        Ok(TransportResponse {
            bytes: response,
            protocol_used: "TLS",
        })
    }

    fn transport_error(&self, detail: String) -> DnsError {
        DnsError::UpstreamTransport {
            server: self.server_addr.to_string(),
            detail,
        }
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
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
        "TLS"
    }
}

mod danger {
    use rustls::client::danger::{
        HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
    };
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, SignatureScheme};

    /// Accepts any server certificate. Installed only when an upstream is
    /// configured with `verify = false`.
    #[derive(Debug)]
    pub(super) struct NoVerify;

    impl ServerCertVerifier for NoVerify {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn verify_tls13_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            rustls::crypto::ring::default_provider()
                .signature_verification_algorithms
                .supported_schemes()
        }
    }
}
