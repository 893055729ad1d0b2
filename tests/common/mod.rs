//! Shared utilities for integration testing.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use docmail::config::ConfigRegistry;
use docmail::mapper::MapperServer;
use docmail::store::http_client;

/// Start a mock document store answering every request through `f`,
/// which maps (method, path-and-query) to (status, JSON body).
pub async fn start_mock_store<F>(f: F) -> SocketAddr
where
    F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buffer = [0u8; 8192];
                        let read = match socket.read(&mut buffer).await {
                            Ok(n) => n,
                            Err(_) => return,
                        };
                        let request = String::from_utf8_lossy(&buffer[..read]);
                        let mut parts = request.split_whitespace();
                        let method = parts.next().unwrap_or("").to_string();
                        let path = parts.next().unwrap_or("").to_string();

                        let (status, body) = f(&method, &path);
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mapper server on an ephemeral port with the given config file
/// content. The returned temp file keeps the configuration alive.
#[allow(dead_code)]
pub async fn start_mapper(config: &str) -> (SocketAddr, tempfile::NamedTempFile) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config.as_bytes()).unwrap();
    file.flush().unwrap();

    let registry = ConfigRegistry::new();
    let http = http_client().unwrap();
    let server = MapperServer::new(registry, Some(file.path().to_path_buf()), http);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.run(listener));

    (addr, file)
}

/// Send one raw lookup request and collect the full response.
#[allow(dead_code)]
pub async fn lookup(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}
