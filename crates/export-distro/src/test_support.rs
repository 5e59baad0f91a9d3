//! Shared fixtures for unit tests: in-process sinks.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{body::Bytes, http::StatusCode, Router};
use export_types::Addressable;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// HTTP endpoint that records every request body on arrival, then answers
/// with a fixed status after a fixed latency.
pub struct CaptureServer {
    addr: SocketAddr,
    received: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl CaptureServer {
    /// Answers `200 OK` immediately.
    pub async fn start() -> Self {
        Self::spawn(Duration::ZERO, StatusCode::OK).await
    }

    /// Records the body at once but holds the response for `latency`, so the
    /// sender stays in flight.
    pub async fn with_latency(latency: Duration) -> Self {
        Self::spawn(latency, StatusCode::OK).await
    }

    /// Answers every request with `status`.
    pub async fn responding(status: StatusCode) -> Self {
        Self::spawn(Duration::ZERO, status).await
    }

    async fn spawn(latency: Duration, status: StatusCode) -> Self {
        let (tx, received) = mpsc::unbounded_channel();
        let app = Router::new().fallback(move |body: Bytes| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body.to_vec());
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                status
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, received }
    }

    /// REST addressable pointing at this server.
    pub fn addressable(&self) -> Addressable {
        Addressable {
            protocol: "http".to_string(),
            address: self.addr.ip().to_string(),
            port: self.addr.port(),
            path: "/ingest".to_string(),
            ..Default::default()
        }
    }

    /// Next captured body, or `None` after two seconds.
    pub async fn next(&mut self) -> Option<Vec<u8>> {
        self.next_within(Duration::from_secs(2)).await
    }

    pub async fn next_within(&mut self, wait: Duration) -> Option<Vec<u8>> {
        tokio::time::timeout(wait, self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// `true` if nothing arrives within 300ms.
    pub async fn expect_silence(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(300), self.received.recv())
            .await
            .is_err()
    }
}

/// REST addressable that never responds: the port accepts connections but
/// nobody reads from them. Keep the listener alive for the test's duration.
pub async fn stalled_addressable() -> (TcpListener, Addressable) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let addressable = Addressable {
        address: addr.ip().to_string(),
        port: addr.port(),
        ..Default::default()
    };
    (listener, addressable)
}

/// REST addressable with nothing listening.
pub fn unreachable_addressable() -> Addressable {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Addressable {
        address: "127.0.0.1".to_string(),
        port,
        ..Default::default()
    }
}
