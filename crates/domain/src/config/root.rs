use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::hosts::HostRecord;
use super::server::ServerConfig;
use super::upstream::{Protocol, UpstreamServer};

/// Complete Hearth DNS configuration.
///
/// Loaded once at startup and treated as immutable by the resolver core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dns: DnsConfig,

    /// Upstream resolvers in preference order
    #[serde(default)]
    pub upstream: Vec<UpstreamServer>,

    /// Suffix appended to bare configured hostnames (default: "home")
    #[serde(default = "default_home_domain")]
    pub home_dns_domain: String,

    #[serde(default)]
    pub hosts: Vec<HostRecord>,

    /// Log level: debug|info|warn|error (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_home_domain() -> String {
    "home".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dns: DnsConfig::default(),
            upstream: vec![],
            home_dns_domain: default_home_domain(),
            hosts: vec![],
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Address the listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.server.address.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Check every validation rule; the first violation wins
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.server.address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidAddress(self.server.address.clone()));
        }

        for (index, upstream) in self.upstream.iter().enumerate() {
            if upstream.address.is_empty() {
                return Err(ConfigError::EmptyUpstreamAddress { index });
            }
            // DoH endpoints may be configured by hostname; the socket
            // transports need an IP literal.
            if !matches!(upstream.protocol, Protocol::Https) {
                upstream.socket_addr()?;
            }
        }

        for (index, host) in self.hosts.iter().enumerate() {
            if host.hostname.is_empty() {
                return Err(ConfigError::EmptyHostname { index });
            }
            for ip in &host.ipv4 {
                if ip.parse::<Ipv4Addr>().is_err() {
                    return Err(ConfigError::InvalidHostIp {
                        hostname: host.hostname.clone(),
                        ip: ip.clone(),
                    });
                }
            }
            for ip in &host.ipv6 {
                if ip.parse::<Ipv6Addr>().is_err() {
                    return Err(ConfigError::InvalidHostIp {
                        hostname: host.hostname.clone(),
                        ip: ip.clone(),
                    });
                }
            }
            if host.ipv4.is_empty() && host.ipv6.is_empty() {
                return Err(ConfigError::HostWithoutAddress {
                    hostname: host.hostname.clone(),
                });
            }
        }

        match self.log_level.as_str() {
            "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }
}
