use serde::{Deserialize, Serialize};

/// Local hostname → address mapping
///
/// A bare label (no dot) is qualified with the configured home suffix;
/// a hostname that already contains a dot is used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostRecord {
    /// Bare label (e.g. "laptop") or qualified name (e.g. "nas.lab")
    pub hostname: String,

    /// IPv4 literals, answered for A queries in insertion order
    #[serde(default)]
    pub ipv4: Vec<String>,

    /// IPv6 literals, answered for AAAA queries in insertion order
    #[serde(default)]
    pub ipv6: Vec<String>,
}

impl HostRecord {
    /// Normalized short name: lowercased, trailing dot stripped
    pub fn short_name(&self) -> String {
        self.hostname
            .strip_suffix('.')
            .unwrap_or(&self.hostname)
            .to_lowercase()
    }

    /// Fully qualified name. A hostname containing a dot is treated as
    /// already qualified; the home suffix is never appended to it.
    pub fn fqdn(&self, home_suffix: &str) -> String {
        let short = self.short_name();
        if short.contains('.') {
            short
        } else {
            format!("{short}.{home_suffix}")
        }
    }
}
