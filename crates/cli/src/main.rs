//! # Hearth DNS
//!
//! Recursive DNS resolver for home networks: local host records, a
//! domain blocklist, and upstream forwarding over UDP, TCP, DoT, and DoH.

mod bootstrap;

use clap::Parser;
use hearth_dns_infrastructure::dns::DnsServer;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "hearth-dns")]
#[command(version)]
#[command(about = "Recursive DNS resolver for home networks")]
struct Cli {
    /// Path to the configuration file
    #[arg(value_name = "CONFIG", default_value = "hearth.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(&cli.config)?;
    bootstrap::init_logging(&config);
    bootstrap::log_startup_summary(&config, &cli.config);

    let handler = bootstrap::build_handler(&config)?;
    let bind_addr = config.socket_addr()?;

    let (server, handle) = DnsServer::bind(bind_addr, handler).await?;

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                handle.stop();
            }
            Err(err) => error!(%err, "failed to listen for shutdown signal"),
        }
    });

    server.serve().await?;
    Ok(())
}
