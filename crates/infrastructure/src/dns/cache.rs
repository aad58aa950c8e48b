//! Bounded TTL-aware cache for forwarded answers.
//!
//! Keyed by (normalized name, query type). An entry lives until the
//! minimum TTL of its records has elapsed; hits are handed out with the
//! remaining TTL stamped on each record. Local answers and blocked names
//! never enter the cache.

use hickory_proto::rr::{Record, RecordType};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    name: Box<str>,
    qtype: RecordType,
}

struct CacheEntry {
    records: Vec<Record>,
    stored_at: Instant,
    ttl: Duration,
}

pub struct ResponseCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            inner: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Cached answers with remaining TTL, or `None` on miss/expiry.
    pub fn get(&self, name: &str, qtype: RecordType) -> Option<Vec<Record>> {
        let key = CacheKey {
            name: name.into(),
            qtype,
        };
        let mut cache = self.inner.lock().unwrap();
        let entry = cache.get(&key)?;

        let elapsed = entry.stored_at.elapsed();
        if elapsed >= entry.ttl {
            cache.pop(&key);
            return None;
        }

        let remaining = (entry.ttl - elapsed).as_secs() as u32;
        let records = entry
            .records
            .iter()
            .cloned()
            .map(|mut record| {
                record.set_ttl(remaining);
                record
            })
            .collect();
        Some(records)
    }

    /// Store a positive answer set. Entries whose minimum TTL is zero are
    /// not worth caching and are skipped.
    pub fn insert(&self, name: &str, qtype: RecordType, records: &[Record]) {
        let Some(min_ttl) = records.iter().map(Record::ttl).min() else {
            return;
        };
        if min_ttl == 0 {
            return;
        }

        let key = CacheKey {
            name: name.into(),
            qtype,
        };
        let entry = CacheEntry {
            records: records.to_vec(),
            stored_at: Instant::now(),
            ttl: Duration::from_secs(u64::from(min_ttl)),
        };
        self.inner.lock().unwrap().put(key, entry);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
