//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use blogtraffic::config::BlogConfig;
use blogtraffic::http::HttpServer;
use blogtraffic::lifecycle::shutdown::wait;
use blogtraffic::lifecycle::Shutdown;

pub const SECRET: &str = "integration-secret";
pub const TOKEN: &str = "integration-token";

/// What a programmable upstream does with one request.
pub enum Reply {
    Respond(u16, String),
    /// Close the connection without answering.
    Drop,
}

/// Start a programmable upstream on an ephemeral port.
///
/// `f` receives the request target (path and query) of every request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let Some(target) = read_request_target(&mut socket).await else {
                    return;
                };
                match f(target).await {
                    Reply::Respond(status, body) => {
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Reply::Drop => drop(socket),
                }
            });
        }
    });

    addr
}

/// Start an upstream that always answers `200` with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { Reply::Respond(200, body.to_string()) })
        .await
}

async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Config with test credentials and no store file.
pub fn test_config() -> BlogConfig {
    let mut config = BlogConfig::default();
    config.auth.secret_key = SECRET.into();
    config.auth.api_token = TOKEN.into();
    config
}

/// A running server and the handle that stops it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server for `config` on an ephemeral port.
pub async fn spawn_server(config: BlogConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener, wait(stopped)).await.unwrap();
    });

    TestServer { addr, shutdown }
}
