//! # End-to-End Runtime Tests
//!
//! Runs the assembled service: JSON file store, HTTP control surface and
//! distribution loop, driven over real HTTP.
//!
//! ```text
//! reqwest ──POST /api/v1/events──> ExportRuntime ──> CaptureSink
//!         ──PUT  /api/v1/notify──>      ^
//!                                       │
//!                          registrations.json (tempdir)
//! ```

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use export_distro::{LoopExit, ShutdownReason};
    use export_runtime::{ExportRuntime, RuntimeConfig};
    use export_types::{Event, Registration};
    use tempfile::TempDir;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    use crate::fixtures::{rest_registration, CaptureSink};

    struct RunningService {
        addr: SocketAddr,
        client: reqwest::Client,
        stop: oneshot::Sender<()>,
        task: JoinHandle<anyhow::Result<LoopExit>>,
    }

    impl RunningService {
        async fn start(registrations_path: PathBuf) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (stop, stopped) = oneshot::channel::<()>();

            let config = RuntimeConfig {
                registrations_path,
                ..Default::default()
            };
            let task = tokio::spawn(ExportRuntime::new(config).run(listener, async move {
                let _ = stopped.await;
                ShutdownReason::Requested("test complete".to_string())
            }));

            Self {
                addr,
                client: reqwest::Client::new(),
                stop,
                task,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("http://{}{}", self.addr, path)
        }

        async fn post_event(&self, event: &Event) -> reqwest::StatusCode {
            self.client
                .post(self.url("/api/v1/events"))
                .json(event)
                .send()
                .await
                .unwrap()
                .status()
        }

        async fn notify(&self) -> reqwest::StatusCode {
            self.client
                .put(self.url("/api/v1/notify/registrations"))
                .send()
                .await
                .unwrap()
                .status()
        }

        async fn stop(self) -> anyhow::Result<LoopExit> {
            let _ = self.stop.send(());
            tokio::time::timeout(Duration::from_secs(10), self.task)
                .await
                .unwrap()
                .unwrap()
        }
    }

    fn write_registrations(path: &Path, registrations: &[Registration]) {
        std::fs::write(path, serde_json::to_vec_pretty(registrations).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_posted_event_reaches_registered_sink() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registrations.json");
        let mut sink = CaptureSink::start().await;
        write_registrations(&path, &[rest_registration("r1", sink.addressable())]);

        let service = RunningService::start(path).await;
        let event = Event::new("d1").with_reading("value", "42");
        assert_eq!(service.post_event(&event).await, reqwest::StatusCode::ACCEPTED);

        let payload: Event = serde_json::from_slice(&sink.next().await.unwrap()).unwrap();
        assert_eq!(payload, event);

        let exit = service.stop().await.unwrap();
        assert_eq!(exit.stopped_actors, 1);
        assert_eq!(exit.events_received, 1);
    }

    #[tokio::test]
    async fn test_rewritten_file_applies_after_notify() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registrations.json");
        let mut sink = CaptureSink::start().await;
        write_registrations(&path, &[rest_registration("r1", sink.addressable())]);

        let service = RunningService::start(path.clone()).await;
        assert_eq!(
            service.post_event(&Event::new("d1")).await,
            reqwest::StatusCode::ACCEPTED
        );
        assert!(sink.next().await.is_some());

        write_registrations(&path, &[]);
        assert_eq!(service.notify().await, reqwest::StatusCode::ACCEPTED);
        assert_eq!(
            service.post_event(&Event::new("d1")).await,
            reqwest::StatusCode::ACCEPTED
        );

        assert!(sink.is_silent().await);
        assert_eq!(service.stop().await.unwrap().stopped_actors, 0);
    }

    #[tokio::test]
    async fn test_missing_file_starts_with_no_registrations() {
        let dir = TempDir::new().unwrap();
        let service = RunningService::start(dir.path().join("absent.json")).await;

        let pong = service
            .client
            .get(service.url("/api/v1/ping"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(pong, "pong");

        let exit = service.stop().await.unwrap();
        assert_eq!(exit.stopped_actors, 0);
        assert!(matches!(exit.reason, ShutdownReason::Requested(_)));
    }

    #[tokio::test]
    async fn test_unreadable_store_fails_the_runtime() {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = RuntimeConfig {
            registrations_path: dir.path().to_path_buf(),
            ..Default::default()
        };

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            ExportRuntime::new(config).run(listener, std::future::pending()),
        )
        .await
        .unwrap();
        assert!(result.is_err());
    }
}
