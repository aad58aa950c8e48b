//! Query pipeline scenarios: local answers, blocklist, recursion policy,
//! caching, and concurrent lookups.

use async_trait::async_trait;
use hearth_dns_domain::{Config, HostRecord, RecordFamily, UpstreamServer};
use hearth_dns_infrastructure::dns::{Forwarder, QueryEngine, ResolverTables};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{LowerName, Name, RData, Record, RecordType};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Forwarder double that counts invocations and returns a scripted answer
struct MockForwarder {
    calls: AtomicUsize,
    answers: Option<Vec<Record>>,
}

impl MockForwarder {
    fn answering(ip: &str) -> Self {
        let record = Record::from_rdata(
            Name::from_str("example.com.").unwrap(),
            60,
            RData::A(ip.parse::<std::net::Ipv4Addr>().unwrap().into()),
        );
        Self {
            calls: AtomicUsize::new(0),
            answers: Some(vec![record]),
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answers: None,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Forwarder for MockForwarder {
    async fn forward(&self, _name: &Name, _qtype: RecordType) -> Option<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.clone()
    }
}

fn host(hostname: &str, ipv4: &[&str], ipv6: &[&str]) -> HostRecord {
    HostRecord {
        hostname: hostname.to_string(),
        ipv4: ipv4.iter().map(|s| s.to_string()).collect(),
        ipv6: ipv6.iter().map(|s| s.to_string()).collect(),
    }
}

fn base_config() -> Config {
    let mut config = Config::default();
    // Keep upstream-call counting deterministic; the cache gets its own test
    config.dns.cache_size = 0;
    config
}

fn lower(name: &str) -> LowerName {
    LowerName::from(Name::from_str(name).unwrap())
}

fn rdata_strings(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.data().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn local_a_answer_for_short_and_qualified_names() {
    let mut config = base_config();
    config.hosts = vec![host("laptop", &["192.168.1.101"], &[])];
    let forwarder = Arc::new(MockForwarder::failing());
    let engine = QueryEngine::new(&config, Some(forwarder.clone()));

    for name in ["laptop.home.", "LAPTOP.", "laptop."] {
        let answer = engine.answer(&lower(name), RecordType::A).await;
        assert_eq!(answer.rcode, ResponseCode::NoError, "query {name}");
        let records = answer.records.as_slice();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ttl(), 300);
        assert_eq!(records[0].name().to_string(), "laptop.home.");
        assert_eq!(records[0].data().unwrap().to_string(), "192.168.1.101");
    }

    // Local answers never touch an upstream
    assert_eq!(forwarder.call_count(), 0);
}

#[tokio::test]
async fn v6_only_host_answers_aaaa_but_not_a() {
    let mut config = base_config();
    config.hosts = vec![host("v6only", &[], &["2001:db8::1"])];
    config.dns.enable_recursion = false;
    let engine = QueryEngine::new(&config, None);

    let a = engine.answer(&lower("v6only.home."), RecordType::A).await;
    assert_eq!(a.rcode, ResponseCode::NoError);
    assert!(a.records.is_empty());

    let aaaa = engine.answer(&lower("v6only.home."), RecordType::AAAA).await;
    assert_eq!(aaaa.rcode, ResponseCode::NoError);
    assert_eq!(rdata_strings(aaaa.records.as_slice()), vec!["2001:db8::1"]);
}

#[tokio::test]
async fn blocked_names_get_nxdomain_and_never_reach_upstream() {
    let mut config = base_config();
    config.dns.block_list = vec!["evil.com".to_string()];
    let forwarder = Arc::new(MockForwarder::answering("6.6.6.6"));
    let engine = QueryEngine::new(&config, Some(forwarder.clone()));

    for name in ["evil.com.", "sub.evil.com."] {
        let answer = engine.answer(&lower(name), RecordType::A).await;
        assert_eq!(answer.rcode, ResponseCode::NXDomain, "query {name}");
        assert!(answer.records.is_empty());
    }
    assert_eq!(forwarder.call_count(), 0);

    // A near-miss is forwarded as usual
    let answer = engine.answer(&lower("notevil.com."), RecordType::A).await;
    assert_eq!(answer.rcode, ResponseCode::NoError);
    assert_eq!(answer.records.len(), 1);
    assert_eq!(forwarder.call_count(), 1);
}

#[tokio::test]
async fn blocklist_wins_over_local_records() {
    let mut config = base_config();
    config.hosts = vec![host("printer", &["192.168.1.9"], &[])];
    config.dns.block_list = vec!["printer.home".to_string()];
    let engine = QueryEngine::new(&config, None);

    let answer = engine.answer(&lower("printer.home."), RecordType::A).await;
    assert_eq!(answer.rcode, ResponseCode::NXDomain);
    assert!(answer.records.is_empty());
}

#[tokio::test]
async fn recursion_disabled_makes_zero_upstream_calls() {
    let mut config = base_config();
    config.dns.enable_recursion = false;
    let forwarder = Arc::new(MockForwarder::answering("1.2.3.4"));
    let engine = QueryEngine::new(&config, Some(forwarder.clone()));

    let answer = engine.answer(&lower("google.com."), RecordType::A).await;
    assert_eq!(answer.rcode, ResponseCode::NoError);
    assert!(answer.records.is_empty());
    assert!(!engine.recursion_enabled());
    assert_eq!(forwarder.call_count(), 0);
}

#[tokio::test]
async fn qualified_hostname_is_not_suffixed_with_home_domain() {
    let mut config = base_config();
    config.hosts = vec![host("nas.lab", &["192.168.1.20"], &[])];
    config.dns.enable_recursion = false;
    let engine = QueryEngine::new(&config, None);

    let direct = engine.answer(&lower("nas.lab."), RecordType::A).await;
    assert_eq!(rdata_strings(direct.records.as_slice()), vec!["192.168.1.20"]);

    let suffixed = engine.answer(&lower("nas.lab.home."), RecordType::A).await;
    assert_eq!(suffixed.rcode, ResponseCode::NoError);
    assert!(suffixed.records.is_empty());
}

#[tokio::test]
async fn upstream_failure_yields_noerror_with_no_answers() {
    let config = base_config();
    let forwarder = Arc::new(MockForwarder::failing());
    let engine = QueryEngine::new(&config, Some(forwarder.clone()));

    let answer = engine.answer(&lower("example.com."), RecordType::A).await;
    assert_eq!(answer.rcode, ResponseCode::NoError);
    assert!(answer.records.is_empty());
    assert_eq!(forwarder.call_count(), 1);
}

#[tokio::test]
async fn any_query_returns_both_families_from_local_records() {
    let mut config = base_config();
    config.hosts = vec![host("dual", &["192.168.1.5"], &["2001:db8::5"])];
    config.dns.enable_recursion = false;
    let engine = QueryEngine::new(&config, None);

    let answer = engine.answer(&lower("dual.home."), RecordType::ANY).await;
    assert_eq!(answer.rcode, ResponseCode::NoError);
    assert_eq!(
        rdata_strings(answer.records.as_slice()),
        vec!["192.168.1.5", "2001:db8::5"]
    );
}

#[tokio::test]
async fn forwarded_answers_are_cached_until_ttl() {
    let mut config = base_config();
    config.dns.cache_size = 16;
    let forwarder = Arc::new(MockForwarder::answering("93.184.216.34"));
    let engine = QueryEngine::new(&config, Some(forwarder.clone()));

    let first = engine.answer(&lower("example.com."), RecordType::A).await;
    assert_eq!(first.records.len(), 1);
    assert_eq!(forwarder.call_count(), 1);

    let second = engine.answer(&lower("example.com."), RecordType::A).await;
    assert_eq!(
        rdata_strings(second.records.as_slice()),
        rdata_strings(first.records.as_slice())
    );
    // Served from cache; the upstream was not consulted again
    assert_eq!(forwarder.call_count(), 1);
}

#[tokio::test]
async fn concurrent_identical_lookups_return_identical_answers() {
    let mut config = base_config();
    config.hosts = vec![host("laptop", &["192.168.1.101", "192.168.1.102"], &[])];
    config.dns.enable_recursion = false;
    let engine = Arc::new(QueryEngine::new(&config, None));

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::spawn(async move {
            let answer = engine.answer(&lower("laptop.home."), RecordType::A).await;
            (answer.rcode, rdata_strings(answer.records.as_slice()))
        }));
    }

    let expected = (
        ResponseCode::NoError,
        vec!["192.168.1.101".to_string(), "192.168.1.102".to_string()],
    );
    for task in tasks {
        assert_eq!(task.await.unwrap(), expected);
    }
}

#[tokio::test]
async fn rebuild_swaps_in_the_new_configuration() {
    let mut config = base_config();
    config.hosts = vec![host("old", &["10.0.0.1"], &[])];
    config.dns.enable_recursion = false;
    let engine = QueryEngine::new(&config, None);

    assert!(!engine.answer(&lower("old.home."), RecordType::A).await.records.is_empty());

    let mut new_config = base_config();
    new_config.hosts = vec![host("new", &["10.0.0.2"], &[])];
    engine.rebuild(&new_config);

    assert!(engine.answer(&lower("old.home."), RecordType::A).await.records.is_empty());
    assert_eq!(
        rdata_strings(
            engine
                .answer(&lower("new.home."), RecordType::A)
                .await
                .records
                .as_slice()
        ),
        vec!["10.0.0.2"]
    );
}

#[test]
fn resolver_tables_build_is_pure() {
    let mut config = Config::default();
    config.hosts = vec![host("laptop", &["192.168.1.101"], &[])];
    config.dns.block_list = vec!["ads.example.com".to_string()];
    config.upstream = vec![UpstreamServer {
        name: None,
        address: "1.1.1.1".to_string(),
        protocol: hearth_dns_domain::Protocol::Udp,
        port: None,
        path: None,
        verify: true,
    }];

    let tables = ResolverTables::build(&config);
    assert!(tables.blocklist.is_blocked("ads.example.com"));
    assert!(tables
        .hosts
        .lookup_answers("laptop.home", RecordFamily::A)
        .is_some());
}
