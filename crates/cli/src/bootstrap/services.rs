use hearth_dns_domain::Config;
use hearth_dns_infrastructure::dns::{DnsHandler, Forwarder, QueryEngine, UpstreamResolver};
use std::sync::Arc;

/// Wire the resolver pipeline together from a validated configuration.
pub fn build_handler(config: &Config) -> anyhow::Result<DnsHandler> {
    let forwarder: Option<Arc<dyn Forwarder>> = if config.dns.enable_recursion {
        let resolver = UpstreamResolver::new(config.upstream.clone())?;
        Some(Arc::new(resolver))
    } else {
        None
    };

    let engine = Arc::new(QueryEngine::new(config, forwarder));
    Ok(DnsHandler::new(engine))
}
