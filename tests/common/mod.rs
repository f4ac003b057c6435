//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use society_gateway::{GatewayConfig, HttpServer, Shutdown};

/// What the mock backend saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub cookie: Option<String>,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub type Log = Arc<Mutex<Vec<Captured>>>;

/// Start a mock backend answering every request with `status` and `body`.
///
/// Returns the log of requests it received.
pub async fn start_backend(addr: SocketAddr, status: u16, body: &'static str) -> Log {
    let listener = TcpListener::bind(addr).await.unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let seen = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, status, body, seen).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    log
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
}

async fn serve_one(socket: TcpStream, status: u16, body: &str, log: Log) -> std::io::Result<()> {
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut cookie = None;
    let mut request_id = None;
    let mut content_type = None;
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "cookie" => cookie = Some(value),
                "x-request-id" => request_id = Some(value),
                "content-type" => content_type = Some(value),
                "content-length" => content_length = value.parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    let mut raw = vec![0u8; content_length];
    reader.read_exact(&mut raw).await?;

    log.lock().unwrap().push(Captured {
        method,
        path,
        cookie,
        request_id,
        content_type,
        body: String::from_utf8_lossy(&raw).into_owned(),
    });

    let status_text = match status {
        200 => "200 OK",
        201 => "201 Created",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let mut socket = reader.into_inner();
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

/// Gateway config pointed at `backend`, listening on `gateway`.
pub fn gateway_config(gateway: SocketAddr, backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = gateway.to_string();
    config.backend.base_url = format!("http://{backend}");
    config.backend.timeout_secs = Some(5);
    config
}

/// Start the gateway with `config`.
///
/// Returns its shutdown handle and the sender feeding reloaded configs.
pub async fn spawn_gateway(config: GatewayConfig) -> (Shutdown, mpsc::UnboundedSender<GatewayConfig>) {
    let shutdown = Shutdown::new();
    let (reload, config_updates) = mpsc::unbounded_channel();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (shutdown, reload)
}

/// Start the gateway pointed at `backend`, returning its shutdown handle.
pub async fn start_gateway(gateway: SocketAddr, backend: SocketAddr) -> Shutdown {
    let (shutdown, _) = spawn_gateway(gateway_config(gateway, backend)).await;
    shutdown
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
