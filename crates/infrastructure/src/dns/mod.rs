pub mod blocklist;
pub mod cache;
pub mod engine;
pub mod forwarding;
pub mod handler;
pub mod host_index;
pub mod server;
pub mod transport;
pub mod upstream;

pub use blocklist::Blocklist;
pub use cache::ResponseCache;
pub use engine::{Answer, QueryEngine, ResolverTables};
pub use handler::DnsHandler;
pub use host_index::HostIndex;
pub use server::{DnsServer, ServerError, ServerHandle, ServerState};
pub use upstream::{Forwarder, UpstreamResolver};
