//! Configuration module for Hearth DNS
//!
//! Configuration structures organized by concern:
//! - `root`: Main configuration, file loading, and validation
//! - `server`: Listener binding
//! - `dns`: Resolution settings and the blocklist
//! - `upstream`: Upstream resolver endpoints
//! - `hosts`: Local hostname → address records
//! - `errors`: Configuration errors

pub mod dns;
pub mod errors;
pub mod hosts;
pub mod root;
pub mod server;
pub mod upstream;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use hosts::HostRecord;
pub use root::Config;
pub use server::ServerConfig;
pub use upstream::{Protocol, UpstreamServer};
