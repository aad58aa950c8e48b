use hearth_dns_domain::Config;
use std::path::Path;
use tracing::info;

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)?;
    Ok(config)
}

/// One-time startup summary so an operator can see at a glance what the
/// resolver will do.
pub fn log_startup_summary(config: &Config, path: &Path) {
    info!(
        config_file = %path.display(),
        bind = %config.server.address,
        port = config.server.port,
        "configuration loaded"
    );

    info!(
        upstreams = config.upstream.len(),
        recursion = config.dns.enable_recursion,
        "upstream forwarding"
    );
    for upstream in &config.upstream {
        info!(
            server = %upstream.display_name(),
            protocol = %upstream.protocol,
            port = upstream.effective_port(),
            verify = upstream.verify,
            "  upstream"
        );
    }

    info!(
        hosts = config.hosts.len(),
        home_suffix = %config.home_dns_domain,
        ttl = config.dns.ttl,
        "local records"
    );
    info!(
        patterns = config.dns.block_list.len(),
        "blocklist loaded"
    );
}
