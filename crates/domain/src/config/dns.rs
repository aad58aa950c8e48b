use serde::{Deserialize, Serialize};

/// DNS resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// TTL in seconds stamped on locally answered records (default: 300)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// When false, upstream forwarding is disabled entirely and queries
    /// with no local answer return NOERROR with an empty answer section
    #[serde(default = "default_true")]
    pub enable_recursion: bool,

    /// Capacity of the forwarded-response cache. 0 disables the cache.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Domain patterns denied with NXDOMAIN. A pattern matches the domain
    /// itself and every subdomain of it; no wildcard metacharacters.
    #[serde(default)]
    pub block_list: Vec<String>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            enable_recursion: true,
            cache_size: default_cache_size(),
            block_list: vec![],
        }
    }
}

fn default_ttl() -> u32 {
    300
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    1000
}
