use anyhow::Context;
use clap::Parser;
use linker_mesh::protocol::{Address, ServiceCategory};
use linker_mesh::service::{ServiceNode, handler_for};
use std::net::{Ipv4Addr, SocketAddr};
use tracing_subscriber::EnvFilter;

/// Run a demo worker that registers with one of the given linkers.
#[derive(Debug, Parser)]
#[command(name = "reply-service", version)]
struct Args {
    /// Port to serve on (and register from)
    #[arg(long)]
    port: u16,

    /// Comma-separated linker addresses, e.g. 127.0.0.1:8080,127.0.0.1:8090
    #[arg(long, value_delimiter = ',', required = true)]
    linkers: Vec<Address>,

    /// Which service to run: reply or time
    #[arg(long, default_value = "reply")]
    category: ServiceCategory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let service = ServiceNode::bind(bind_addr, handler_for(args.category), args.linkers)
        .await
        .with_context(|| format!("binding service socket on {}", bind_addr))?;

    tracing::info!("Starting {} service on {}", args.category, bind_addr);

    service.run().await?;
    Ok(())
}
