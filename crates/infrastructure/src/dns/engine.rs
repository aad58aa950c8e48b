//! Per-question resolution pipeline.
//!
//! Order matters: the blocklist runs first so a locally configured name
//! that is also blocked still blocks, then the host index, then the
//! forwarded-response cache, then upstream forwarding. The host index and
//! blocklist travel together as one immutable snapshot; a rebuild swaps
//! the snapshot atomically while in-flight requests keep the one they
//! started with.

use crate::dns::blocklist::Blocklist;
use crate::dns::cache::ResponseCache;
use crate::dns::host_index::{family_of, normalize_name, HostIndex};
use crate::dns::upstream::Forwarder;
use arc_swap::ArcSwap;
use hearth_dns_domain::{Config, RecordFamily};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{LowerName, Name, Record, RecordType};
use std::sync::Arc;
use tracing::debug;

/// Host index and blocklist built from one configuration install
pub struct ResolverTables {
    pub hosts: HostIndex,
    pub blocklist: Blocklist,
}

impl ResolverTables {
    pub fn build(config: &Config) -> Self {
        Self {
            hosts: HostIndex::build(config),
            blocklist: Blocklist::new(&config.dns.block_list),
        }
    }
}

/// Answer records, either borrowed from the host index snapshot or owned
/// (forwarded / merged) for this response.
pub enum AnswerRecords {
    Shared(Arc<[Record]>),
    Owned(Vec<Record>),
}

impl AnswerRecords {
    pub fn as_slice(&self) -> &[Record] {
        match self {
            AnswerRecords::Shared(records) => records,
            AnswerRecords::Owned(records) => records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }
}

/// Outcome for one question
pub struct Answer {
    pub rcode: ResponseCode,
    pub records: AnswerRecords,
}

impl Answer {
    fn blocked() -> Self {
        Self {
            rcode: ResponseCode::NXDomain,
            records: AnswerRecords::Owned(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self {
            rcode: ResponseCode::NoError,
            records: AnswerRecords::Owned(Vec::new()),
        }
    }

    fn with_records(records: AnswerRecords) -> Self {
        Self {
            rcode: ResponseCode::NoError,
            records,
        }
    }
}

pub struct QueryEngine {
    tables: ArcSwap<ResolverTables>,
    forwarder: Option<Arc<dyn Forwarder>>,
    cache: Option<ResponseCache>,
}

impl QueryEngine {
    /// Assemble the engine from a validated configuration.
    ///
    /// When recursion is disabled the forwarder is discarded entirely, so
    /// no code path can reach an upstream.
    pub fn new(config: &Config, forwarder: Option<Arc<dyn Forwarder>>) -> Self {
        let forwarder = if config.dns.enable_recursion {
            forwarder
        } else {
            None
        };
        Self {
            tables: ArcSwap::from_pointee(ResolverTables::build(config)),
            forwarder,
            cache: ResponseCache::new(config.dns.cache_size),
        }
    }

    pub fn recursion_enabled(&self) -> bool {
        self.forwarder.is_some()
    }

    /// Atomically replace the host index and blocklist from a new
    /// configuration. Readers that already hold the old snapshot finish
    /// their request against it.
    pub fn rebuild(&self, config: &Config) {
        self.tables.store(Arc::new(ResolverTables::build(config)));
        debug!("resolver tables rebuilt");
    }

    /// Resolve one question through the full pipeline.
    pub async fn answer(&self, name: &LowerName, qtype: RecordType) -> Answer {
        let name_text = name.to_string();
        let key = normalize_name(&name_text).into_owned();

        let tables = self.tables.load_full();

        if tables.blocklist.is_blocked(&key) {
            debug!(name = %key, "query blocked");
            return Answer::blocked();
        }

        if let Some(family) = family_of(qtype) {
            if let Some(records) = tables.hosts.lookup_answers(&key, family) {
                debug!(name = %key, %family, answers = records.len(), "local answer");
                return Answer::with_records(AnswerRecords::Shared(records));
            }
        } else if qtype == RecordType::ANY {
            if let Some(host) = tables.hosts.lookup_host(&key) {
                let mut records = Vec::new();
                for family in [RecordFamily::A, RecordFamily::Aaaa] {
                    if let Some(answers) = tables.hosts.lookup_answers(&key, family) {
                        records.extend(answers.iter().cloned());
                    }
                }
                if !records.is_empty() {
                    debug!(hostname = %host.hostname, "ANY answered from local records");
                    return Answer::with_records(AnswerRecords::Owned(records));
                }
            }
        }

        let Some(forwarder) = &self.forwarder else {
            return Answer::empty();
        };

        if let Some(cache) = &self.cache {
            if let Some(records) = cache.get(&key, qtype) {
                debug!(name = %key, "cache hit");
                return Answer::with_records(AnswerRecords::Owned(records));
            }
        }

        let query_name = Name::from(name.clone());
        match forwarder.forward(&query_name, qtype).await {
            Some(records) => {
                if let Some(cache) = &self.cache {
                    cache.insert(&key, qtype, &records);
                }
                Answer::with_records(AnswerRecords::Owned(records))
            }
            None => Answer::empty(),
        }
    }
}
