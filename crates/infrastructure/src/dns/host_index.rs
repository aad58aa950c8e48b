//! Precomputed lookup table for locally configured hosts.
//!
//! Rebuilt once per configuration install; the hot path is a single hash
//! lookup returning pre-materialized answer records, with no per-request
//! parsing of IP literals.

use hearth_dns_domain::{Config, HostRecord, RecordFamily};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Lowercase a name and strip its trailing dot for index keys.
///
/// Names arriving from the wire are usually already lowercase, so the
/// common case borrows.
pub(crate) fn normalize_name(name: &str) -> Cow<'_, str> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(trimmed.to_ascii_lowercase())
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Address family a query type can be answered from locally
pub(crate) fn family_of(qtype: RecordType) -> Option<RecordFamily> {
    match qtype {
        RecordType::A => Some(RecordFamily::A),
        RecordType::AAAA => Some(RecordFamily::Aaaa),
        _ => None,
    }
}

/// Read-mostly map from `normalized-name:FAMILY` to prebuilt answer
/// records. Replaced wholesale on rebuild, never mutated in place.
pub struct HostIndex {
    records: FxHashMap<String, Arc<[Record]>>,
    hosts: FxHashMap<String, Arc<HostRecord>>,
}

impl HostIndex {
    /// Walk `hosts[]` once and materialize every answer record.
    ///
    /// Each host is indexed under its short and qualified names, each with
    /// and without a trailing dot, all lowercased. The variants collapse
    /// when the configured hostname is already qualified, so a host never
    /// contributes duplicate answers to its own name.
    pub fn build(config: &Config) -> Self {
        let mut records: FxHashMap<String, Arc<[Record]>> = FxHashMap::default();
        let mut hosts: FxHashMap<String, Arc<HostRecord>> = FxHashMap::default();
        let ttl = config.dns.ttl;

        for host in &config.hosts {
            let short = host.short_name();
            let full = host.fqdn(&config.home_dns_domain);

            // Canonical owner name used by every answer for this host
            let owner = match Name::from_str(&format!("{full}.")) {
                Ok(name) => name,
                Err(error) => {
                    warn!(hostname = %host.hostname, %error, "skipping host with invalid name");
                    continue;
                }
            };

            let a_records = materialize_a(host, &owner, ttl);
            let aaaa_records = materialize_aaaa(host, &owner, ttl);

            let mut variants = vec![short.clone(), format!("{short}.")];
            if full != short {
                variants.push(full.clone());
                variants.push(format!("{full}."));
            }

            let shared_host = Arc::new(host.clone());
            for variant in variants {
                hosts.insert(variant.clone(), Arc::clone(&shared_host));
                if let Some(ref recs) = a_records {
                    insert_shared(
                        &mut records,
                        record_key(&variant, RecordFamily::A),
                        recs,
                    );
                }
                if let Some(ref recs) = aaaa_records {
                    insert_shared(
                        &mut records,
                        record_key(&variant, RecordFamily::Aaaa),
                        recs,
                    );
                }
            }
        }

        Self { records, hosts }
    }

    /// Prebuilt answers for a name and family; `None` when no host matches
    /// or the host has no addresses in that family.
    pub fn lookup_answers(&self, name: &str, family: RecordFamily) -> Option<Arc<[Record]>> {
        let normalized = normalize_name(name);
        let key = record_key(&normalized, family);
        self.records.get(&key).cloned()
    }

    /// Raw configured record for a name, for callers that want the tuple
    /// itself (ANY-type handling, debugging).
    pub fn lookup_host(&self, name: &str) -> Option<Arc<HostRecord>> {
        let normalized = normalize_name(name);
        self.hosts.get(normalized.as_ref()).cloned()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

fn record_key(name: &str, family: RecordFamily) -> String {
    format!("{}:{}", name, family.as_str())
}

fn materialize_a(host: &HostRecord, owner: &Name, ttl: u32) -> Option<Arc<[Record]>> {
    let records: Vec<Record> = host
        .ipv4
        .iter()
        .filter_map(|literal| literal.parse::<Ipv4Addr>().ok())
        .map(|ip| Record::from_rdata(owner.clone(), ttl, RData::A(ip.into())))
        .collect();
    if records.is_empty() {
        None
    } else {
        Some(records.into())
    }
}

fn materialize_aaaa(host: &HostRecord, owner: &Name, ttl: u32) -> Option<Arc<[Record]>> {
    let records: Vec<Record> = host
        .ipv6
        .iter()
        .filter_map(|literal| literal.parse::<Ipv6Addr>().ok())
        .map(|ip| Record::from_rdata(owner.clone(), ttl, RData::AAAA(ip.into())))
        .collect();
    if records.is_empty() {
        None
    } else {
        Some(records.into())
    }
}

/// Insert a shared answer slice, merging when two hosts map the same name
fn insert_shared(
    map: &mut FxHashMap<String, Arc<[Record]>>,
    key: String,
    records: &Arc<[Record]>,
) {
    match map.entry(key) {
        Entry::Vacant(vacant) => {
            vacant.insert(Arc::clone(records));
        }
        Entry::Occupied(mut occupied) => {
            let merged: Vec<Record> = occupied
                .get()
                .iter()
                .chain(records.iter())
                .cloned()
                .collect();
            occupied.insert(merged.into());
        }
    }
}
