//! Hearth DNS Domain Layer
pub mod config;
pub mod errors;
pub mod record_family;

pub use config::{
    Config, ConfigError, DnsConfig, HostRecord, Protocol, ServerConfig, UpstreamServer,
};
pub use errors::DnsError;
pub use record_family::RecordFamily;
