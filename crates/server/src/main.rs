use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use addis_transit::network::NetworkStore;
use addis_transit_server::config::{read_config, read_network, ServerConfig};
use addis_transit_server::logging::init_logger;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "addis-transit-server",
    author,
    version,
    about = "Live bus positions, arrivals and trip planning for Addis Ababa"
)]
struct Args {
    /// JSON server configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network definition JSON (overrides the config file)
    #[arg(short, long)]
    network: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger();

    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(network) = args.network {
        config.network_file = network;
    }
    if let Some(bind) = args.bind {
        config.http_address = bind;
    }

    let definition = read_network(&config.network_file)?;
    let store = NetworkStore::from_definition(definition).with_context(|| {
        format!("Invalid network in {}", config.network_file.display())
    })?;
    info!(bind = %config.http_address, "Starting addis-transit-server");

    addis_transit_server::serve(config, Arc::new(store)).await
}
