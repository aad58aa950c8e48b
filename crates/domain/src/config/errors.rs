use std::path::PathBuf;
use thiserror::Error;

use super::upstream::Protocol;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid port: 0 (must be 1-65535)")]
    InvalidPort,

    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    #[error("upstream server {index}: address cannot be empty")]
    EmptyUpstreamAddress { index: usize },

    #[error("upstream server {address}: {protocol} transport requires an IP literal")]
    InvalidUpstreamAddress { address: String, protocol: Protocol },

    #[error("host entry {index}: hostname cannot be empty")]
    EmptyHostname { index: usize },

    #[error("host entry {hostname}: invalid IP address: {ip}")]
    InvalidHostIp { hostname: String, ip: String },

    #[error("host entry {hostname}: must have at least one IP address")]
    HostWithoutAddress { hostname: String },

    #[error("invalid log level: {0} (must be debug, info, warn, or error)")]
    InvalidLogLevel(String),
}
