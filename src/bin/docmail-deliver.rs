//! docmail-deliver: file one message into a recipient's mailbox.
//!
//! Intended as an MTA local delivery command: the raw message arrives on
//! stdin, the recipient is the single positional argument. The message is
//! optionally archived to disk, converted to a document, and saved into
//! the collection named by the recipient's user record.

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docmail::config::ConfigRegistry;
use docmail::delivery::{archive_message, build_document};
use docmail::logging::StoreLogger;
use docmail::store::{http_client, StoreClient};

#[derive(Parser, Debug)]
#[command(name = "docmail-deliver", about = "Deliver a message from stdin")]
struct Cli {
    /// Recipient address whose mailbox receives the message.
    recipient: String,

    /// Configuration file path; defaults to $DOCMAIL_CONFIG or docmail.conf.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docmail=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let registry = ConfigRegistry::new();
    let config = registry.instance(cli.config.as_deref())?;
    let http = http_client()?;
    let logger = StoreLogger::new("deliver", registry, cli.config.clone(), http.clone());

    logger
        .notice(&format!("Delivering mail for '{}'", cli.recipient))
        .await;

    let raw = read_message(config.max_message_size).await?;

    if !config.archive_dir.is_empty() {
        let dir = Path::new(&config.archive_dir);
        if dir.is_dir() {
            let path = archive_message(dir, &raw)?;
            tracing::debug!(path = ?path, "Message archived");
        } else {
            logger
                .error(&format!("Archive dir '{}' not found", config.archive_dir))
                .await;
        }
    }

    let doc = build_document(&raw).ok_or("unable to parse message")?;

    let store = StoreClient::from_parts(http, &config.store_host, config.store_port);
    let user = store
        .get_document(&config.users_collection, &cli.recipient)
        .await?;
    let mailbox = user["collection"]
        .as_str()
        .ok_or("user record has no mailbox collection")?;

    store.save_document(mailbox, &doc).await?;

    logger
        .notice(&format!("Delivered mail for '{}'", cli.recipient))
        .await;
    Ok(())
}

/// Read the whole message from stdin, enforcing the size limit.
async fn read_message(max_size: u64) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut stdin = tokio::io::stdin();
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = stdin.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);
        if raw.len() as u64 > max_size {
            return Err("maximum message size exceeded".into());
        }
    }

    Ok(raw)
}
