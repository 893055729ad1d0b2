//! docmail-mapper: TCP alias lookup server.
//!
//! # Architecture Overview
//!
//! ```text
//!   MTA lookup request            ┌──────────────────────────────┐
//!   ──────────────────────────────┼─▶ mapper::server             │
//!   "get <percent-escaped-key>"   │      │                       │
//!                                 │      ▼                       │
//!                                 │   mapper::protocol (decode)  │
//!                                 │      │                       │
//!                                 │      ▼                       │
//!   one status line               │   mapper::resolve ───────────┼──▶ document store
//!   ◀──────────────────────────────┼──  (alias view query)       │    (alias view)
//!                                 │                              │
//!                                 │   config::registry ◀─ notify │
//!                                 │   (hot reload)               │
//!                                 └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docmail::config::ConfigRegistry;
use docmail::mapper::MapperServer;
use docmail::store::http_client;

#[derive(Parser, Debug)]
#[command(name = "docmail-mapper", about = "Alias lookup server for the MTA")]
struct Cli {
    /// Address to listen on for lookup connections.
    #[arg(long, default_value = "127.0.0.1:31337")]
    listen: String,

    /// Configuration file path; defaults to $DOCMAIL_CONFIG or docmail.conf.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docmail=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("docmail-mapper starting");

    let registry = ConfigRegistry::new();
    // A broken config file at startup is fatal; later reload failures are not.
    let config = registry.instance(cli.config.as_deref())?;
    tracing::info!(
        store_host = %config.store_host,
        store_port = config.store_port,
        users_collection = %config.users_collection,
        "Configuration loaded"
    );

    tokio::spawn(registry.clone().run_reload());

    let http = http_client()?;
    let listener = TcpListener::bind(&cli.listen).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for lookup connections");

    let server = MapperServer::new(registry, cli.config, http);
    server.run(listener).await?;

    Ok(())
}
