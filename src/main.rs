use anyhow::{Context, bail};
use clap::Parser;
use linker_mesh::linker::handlers;
use linker_mesh::linker::{LinkerConfig, LinkerNode, PeerSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run one linker of the mesh.
#[derive(Debug, Parser)]
#[command(name = "linker", version)]
struct Args {
    /// Line number (from 0) of this linker in the peer list
    index: usize,

    /// Peer list file, one `host:port` per line
    #[arg(long, default_value = "linkers.txt")]
    peers: PathBuf,

    /// Optional TOML file with node tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve registry diagnostics over HTTP on this address
    #[arg(long)]
    http: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LinkerConfig::load_from_file(path)?,
        None => LinkerConfig::default(),
    };
    if args.http.is_some() {
        config.http_addr = args.http;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let peers = PeerSet::load(&args.peers)
        .with_context(|| format!("loading peer list {}", args.peers.display()))?;

    let Some(local) = peers.get(args.index).cloned() else {
        bail!(
            "linker index {} is out of range: {} has {} entries",
            args.index,
            args.peers.display(),
            peers.len()
        );
    };

    tracing::info!("Starting linker {} of {} at {}", args.index, peers.len(), local);

    let node = LinkerNode::bind(local, peers, config.clone())
        .await
        .context("binding linker socket")?;

    if let Some(http_addr) = config.http_addr {
        let registry = node.registry();
        tokio::spawn(async move {
            if let Err(e) = handlers::serve(http_addr, registry).await {
                tracing::error!("Diagnostics server stopped: {}", e);
            }
        });
    }

    node.start().await?;
    Ok(())
}
