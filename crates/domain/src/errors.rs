use thiserror::Error;

/// Errors raised while resolving against upstream servers.
///
/// Every variant means "this upstream attempt failed"; the resolver reacts
/// to all of them the same way, by moving on to the next configured
/// upstream. Only the aggregate "no upstream succeeded" outcome is visible
/// to clients, as a NOERROR response with an empty answer section.
#[derive(Error, Debug)]
pub enum DnsError {
    #[error("upstream {server} timed out")]
    UpstreamTimeout { server: String },

    #[error("upstream {server} transport error: {detail}")]
    UpstreamTransport { server: String, detail: String },

    #[error("upstream {server} returned HTTP {status}")]
    UpstreamHttpStatus { server: String, status: u16 },

    #[error("upstream {server} sent an invalid response: {detail}")]
    UpstreamParse { server: String, detail: String },

    #[error("invalid query name: {0}")]
    InvalidName(String),
}
