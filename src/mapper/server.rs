//! TCP lookup server.
//!
//! One request per connection: read a single buffer, write one status
//! line, close. The accept loop spawns a task per connection and never
//! exits on a per-connection error.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::config::ConfigRegistry;
use crate::logging::StoreLogger;
use crate::mapper::protocol::{parse_request, LookupResponse};
use crate::mapper::resolve::{AliasResolver, ResolveError};

/// Requests longer than this are truncated; real requests are one short
/// line, so the cutoff is never reached in practice.
pub const READ_BUFFER_SIZE: usize = 4096;

/// The lookup server: resolver plus the logger recording lookup misses.
pub struct MapperServer {
    resolver: AliasResolver,
    logger: StoreLogger,
}

impl MapperServer {
    pub fn new(
        registry: Arc<ConfigRegistry>,
        config_path: Option<PathBuf>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            resolver: AliasResolver::new(registry.clone(), config_path.clone(), http.clone()),
            logger: StoreLogger::new("mapper", registry, config_path, http),
        }
    }

    /// Serve lookups on `listener` until the task is dropped.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let server = Arc::new(self);
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!(peer = %peer, "Lookup connection accepted");
                    let server = server.clone();
                    tokio::spawn(async move {
                        server.handle(stream).await;
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept lookup connection");
                }
            }
        }
    }

    async fn handle(&self, mut stream: TcpStream) {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let read = match stream.read(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read lookup request");
                return;
            }
        };

        let response = self.respond(&buffer[..read]).await;

        if let Err(e) = stream.write_all(response.to_line().as_bytes()).await {
            tracing::debug!(error = %e, "Failed to write lookup response");
        }
        let _ = stream.shutdown().await;
    }

    /// Turn one raw request buffer into the response to write back.
    pub async fn respond(&self, raw: &[u8]) -> LookupResponse {
        let key = match parse_request(raw) {
            Ok(key) => key,
            Err(e) => {
                self.logger
                    .notice(&format!("Rejected lookup request: {e}"))
                    .await;
                return e.into();
            }
        };

        match self.resolver.resolve(&key).await {
            Ok(address) => LookupResponse::Found(address),
            Err(ResolveError::Unknown) => {
                self.logger.notice(&format!("Unknown alias '{key}'")).await;
                LookupResponse::AliasUnknown
            }
            Err(ResolveError::Unavailable) => LookupResponse::StoreUnavailable,
        }
    }
}
