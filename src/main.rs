//! beacond - broadcast message and image generation service

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use beacond::{Config, Server};
use clap::Parser;
use figment::providers::Serialized;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Broadcast message and image generation service
#[derive(Parser, Debug)]
#[command(name = "beacond", version, about)]
struct Args {
    /// TOML config file
    #[arg(short, long, default_value = "beacond.toml")]
    config: PathBuf,

    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database file (overrides config; default beacond.db)
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacond=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut figment = Config::figment(Some(args.config.as_path()));
    if let Some(bind) = args.bind {
        figment = figment.merge(Serialized::default("bind_addr", bind));
    }
    if let Some(database) = &args.database {
        figment = figment.merge(Serialized::default("db_path", database));
    }
    let config = Config::from_figment(&figment)?;

    match &config.db_path {
        Some(path) => info!("Using database {}", path),
        None => warn!("No database path configured; broadcasts will not survive a restart"),
    }

    // Create and run server
    let server = Arc::new(Server::new(config).await?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            signal_server.shutdown();
        }
    });

    server.run().await?;

    Ok(())
}
