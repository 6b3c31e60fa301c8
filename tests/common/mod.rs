//! Shared helpers: a scripted upstream and a running proxy.

use std::net::SocketAddr;
use std::sync::Arc;

use reelgate::{MovieProxy, Server, UpstreamConfig, routes};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

pub const API_KEY: &str = "test-key";

/// A fake upstream that answers every connection with the same raw bytes
/// and reports each request line it saw.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub requests: mpsc::UnboundedReceiver<String>,
}

impl MockUpstream {
    /// Base URL to configure the proxy with.
    pub fn base(&self) -> String {
        format!("http://{}/3/", self.addr)
    }

    pub async fn next_request_line(&mut self) -> String {
        self.requests.recv().await.expect("upstream saw no request")
    }
}

/// `raw` is written verbatim, so tests can send malformed or truncated replies.
pub async fn start_mock_upstream(raw: String) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, requests) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let raw = raw.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&head);
                let line = head.lines().next().unwrap_or_default().to_owned();
                let _ = tx.send(line);

                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream { addr, requests }
}

/// A complete HTTP/1.1 reply with a body.
pub fn reply(status_line: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Sends `GET <target>` over a bare socket, so the target reaches the proxy
/// exactly as written, and returns the whole reply.
pub async fn raw_get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    String::from_utf8_lossy(&reply).into_owned()
}

/// A proxy running on a free port. Dropping it stops the server.
pub struct RunningProxy {
    pub addr: SocketAddr,
    _stop: oneshot::Sender<()>,
}

impl RunningProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }
}

pub async fn start_proxy(upstream_base: &str) -> RunningProxy {
    let upstream = UpstreamConfig::new(upstream_base, API_KEY).unwrap();
    let proxy = Arc::new(MovieProxy::from_config(upstream).unwrap());

    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    tokio::spawn(server.serve_with_shutdown(routes(proxy), async {
        let _ = stopped.await;
    }));

    RunningProxy { addr, _stop: stop }
}
