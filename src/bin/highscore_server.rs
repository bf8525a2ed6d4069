use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use whackavo::protocol::HIGHSCORE_PATH;
use whackavo::server::build_router;
use whackavo::server::config::{resolve_listen_addr, ServerConfig, StoreChoice};

/// shared high score for whackavo
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// address to listen on, overrides HIGHSCORE_ADDR / HIGHSCORE_PORT
    #[clap(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::from_env(|k| env::var(k).ok())?;
    match &config.store {
        StoreChoice::Upstash(creds) => info!(url = %creds.url, "using upstash store"),
        StoreChoice::Memory => info!("using in-memory store, scores vanish on restart"),
        StoreChoice::Unconfigured => {
            warn!("no store configured, data requests will fail until credentials are set")
        }
    }

    let addr = args
        .addr
        .unwrap_or_else(|| resolve_listen_addr(|k| env::var(k).ok()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on http://{}{}", addr, HIGHSCORE_PATH);

    axum::serve(listener, build_router(&config))
        .await
        .context("serving high score api")?;
    Ok(())
}
