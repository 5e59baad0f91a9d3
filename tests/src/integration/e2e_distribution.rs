//! # End-to-End Distribution Tests
//!
//! Drives the distribution loop through its public signals against an
//! in-memory store and real HTTP sinks:
//!
//! ```text
//! InMemoryRegistrationStore ──list──> DistributionLoop ──> actors ──> CaptureSink
//!          ^                               ^     ^
//!          │ save/delete      notify ──────┘     └────── events
//!          └── test
//! ```
//!
//! ## Test Categories
//!
//! 1. **Export**: exact payloads per pipeline configuration
//! 2. **Isolation**: failing or unsupported registrations do not affect others
//! 3. **Reconfiguration**: create, update, delete while running
//! 4. **Lifecycle**: shutdown and fatal conditions

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Arc;
    use std::time::Duration;

    use aes_gcm::aead::{Aead, KeyInit, Payload};
    use aes_gcm::{Aes256Gcm, Nonce};
    use export_distro::{
        DistributionLoop, DistroConfig, DistroError, DistroHandle, DistroSignals,
        InMemoryRegistrationStore, LoopExit, ShutdownReason,
    };
    use export_types::{
        Compression, Destination, EncryptionAlgorithm, EncryptionDetails, Event, Format,
        Registration,
    };
    use flate2::read::GzDecoder;
    use sha2::{Digest, Sha256};
    use tokio::task::JoinHandle;

    use crate::fixtures::{
        offline_broker, rest_registration, unreachable_addressable, CaptureSink,
    };

    struct Harness {
        store: Arc<InMemoryRegistrationStore>,
        handle: DistroHandle,
        task: JoinHandle<Result<LoopExit, DistroError>>,
    }

    impl Harness {
        fn start(registrations: Vec<Registration>) -> Self {
            let store = Arc::new(InMemoryRegistrationStore::with_registrations(registrations));
            let (handle, signals) = DistroSignals::channel(64);
            let distro = DistributionLoop::new(store.clone(), DistroConfig::default());
            Self {
                store,
                handle,
                task: tokio::spawn(distro.run(signals)),
            }
        }

        async fn publish(&self, event: Event) {
            self.handle.events.send(event).await.unwrap();
        }

        fn save(&self, registration: Registration) {
            self.store.save(registration);
            assert!(self.handle.changes.notify());
        }

        fn delete(&self, name: &str) {
            assert!(self.store.delete(name));
            assert!(self.handle.changes.notify());
        }

        async fn stop(self) -> LoopExit {
            self.handle
                .shutdown
                .send(ShutdownReason::Requested("test complete".to_string()))
                .unwrap();
            tokio::time::timeout(Duration::from_secs(10), self.task)
                .await
                .unwrap()
                .unwrap()
                .unwrap()
        }
    }

    fn sample_event() -> Event {
        Event::new("d1").with_reading("value", "42")
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    #[tokio::test]
    async fn test_json_rest_registration_exports_exactly_once() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(vec![rest_registration("r1", sink.addressable())]);

        let event = sample_event();
        harness.publish(event.clone()).await;

        let payload = sink.next().await.expect("event not exported");
        assert_eq!(payload, serde_json::to_vec(&event).unwrap());
        assert!(sink.is_silent().await);

        let exit = harness.stop().await;
        assert_eq!(exit.stopped_actors, 1);
    }

    #[tokio::test]
    async fn test_xml_export() {
        let mut sink = CaptureSink::start().await;
        let registration = Registration::new("xml", Format::Xml, Destination::Rest)
            .with_addressable(sink.addressable());
        let harness = Harness::start(vec![registration]);

        harness.publish(sample_event()).await;

        let payload = String::from_utf8(sink.next().await.unwrap()).unwrap();
        assert!(payload.starts_with("<Event>"));
        assert!(payload.contains("<device>d1</device>"));
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_gzip_then_aes_payload_decodes() {
        let mut sink = CaptureSink::start().await;
        let registration = rest_registration("sealed", sink.addressable())
            .with_compression(Compression::Gzip)
            .with_encryption(EncryptionDetails {
                algorithm: EncryptionAlgorithm::Aes,
                key: "edge-secret".to_string(),
                init_vector: "iv-0001".to_string(),
            });
        let harness = Harness::start(vec![registration]);

        let event = sample_event();
        harness.publish(event.clone()).await;
        let sealed = sink.next().await.unwrap();

        // nonce || ciphertext, key = SHA-256(key string), AAD = init vector
        let key = Sha256::digest(b"edge-secret");
        let cipher = Aes256Gcm::new_from_slice(&key).unwrap();
        let (nonce, ciphertext) = sealed.split_at(12);
        let compressed = cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: b"iv-0001",
                },
            )
            .unwrap();

        let mut json = Vec::new();
        GzDecoder::new(&compressed[..])
            .read_to_end(&mut json)
            .unwrap();
        assert_eq!(json, serde_json::to_vec(&event).unwrap());
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_device_filter_blocks_other_devices() {
        let mut sink = CaptureSink::start().await;
        let registration =
            rest_registration("filtered", sink.addressable()).with_device_filter(["d1"]);
        let harness = Harness::start(vec![registration]);

        harness.publish(Event::new("d2")).await;
        harness.publish(Event::new("d1")).await;

        let payload: Event = serde_json::from_slice(&sink.next().await.unwrap()).unwrap();
        assert_eq!(payload.device, "d1");
        assert!(sink.is_silent().await);
        harness.stop().await;
    }

    // =========================================================================
    // ISOLATION
    // =========================================================================

    #[tokio::test]
    async fn test_one_event_reaches_every_registration() {
        let mut first = CaptureSink::start().await;
        let mut second = CaptureSink::start().await;
        let harness = Harness::start(vec![
            rest_registration("r1", first.addressable()),
            Registration::new("r2", Format::Xml, Destination::Rest)
                .with_addressable(second.addressable()),
        ]);

        harness.publish(sample_event()).await;

        let json = first.next().await.unwrap();
        let xml = second.next().await.unwrap();
        assert_eq!(json, serde_json::to_vec(&sample_event()).unwrap());
        assert!(String::from_utf8(xml).unwrap().starts_with("<Event>"));
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_failing_sender_does_not_affect_sibling() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(vec![
            rest_registration("r1", unreachable_addressable()),
            rest_registration("r2", sink.addressable()),
        ]);

        for _ in 0..3 {
            harness.publish(sample_event()).await;
        }

        for _ in 0..3 {
            assert!(sink.next().await.is_some());
        }
        let exit = harness.stop().await;
        assert_eq!(exit.stopped_actors, 2);
        assert_eq!(exit.events_received, 3);
    }

    #[tokio::test]
    async fn test_unsupported_registrations_get_no_actor() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(vec![
            Registration::new("csv", Format::Csv, Destination::Rest)
                .with_addressable(sink.addressable()),
            Registration::new("azure", Format::AzureJson, Destination::AzureMqtt),
            Registration::new("zmq", Format::Json, Destination::Zmq),
            rest_registration("ok", sink.addressable()),
        ]);

        harness.publish(sample_event()).await;

        assert!(sink.next().await.is_some());
        assert!(sink.is_silent().await);
        assert_eq!(harness.stop().await.stopped_actors, 1);
    }

    // =========================================================================
    // RECONFIGURATION
    // =========================================================================

    #[tokio::test]
    async fn test_registration_created_at_runtime() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(Vec::new());

        harness.save(rest_registration("late", sink.addressable()));
        harness.publish(sample_event()).await;

        assert!(sink.next().await.is_some());
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_deleted_registration_receives_nothing() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(vec![rest_registration("r1", sink.addressable())]);

        harness.publish(sample_event()).await;
        assert!(sink.next().await.is_some());

        harness.delete("r1");
        harness.publish(sample_event()).await;

        assert!(sink.is_silent().await);
        assert_eq!(harness.stop().await.stopped_actors, 0);
    }

    #[tokio::test]
    async fn test_disabling_registration_stops_export() {
        let mut sink = CaptureSink::start().await;
        let registration = rest_registration("r1", sink.addressable());
        let harness = Harness::start(vec![registration.clone()]);

        harness.save(registration.disabled());
        harness.publish(sample_event()).await;

        assert!(sink.is_silent().await);
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_rest_to_mqtt_update_leaves_rest_sink_silent() {
        let mut sink = CaptureSink::start().await;
        let harness = Harness::start(vec![rest_registration("r1", sink.addressable())]);

        harness.publish(sample_event()).await;
        assert!(sink.next().await.is_some());

        harness.save(
            Registration::new("r1", Format::Json, Destination::Mqtt)
                .with_addressable(offline_broker()),
        );
        for _ in 0..3 {
            harness.publish(sample_event()).await;
        }

        assert!(sink.is_silent().await);
        assert_eq!(harness.stop().await.stopped_actors, 1);
    }

    #[tokio::test]
    async fn test_rest_endpoint_moves_between_sinks() {
        let mut old_sink = CaptureSink::start().await;
        let mut new_sink = CaptureSink::start().await;
        let harness = Harness::start(vec![rest_registration("r1", old_sink.addressable())]);

        harness.save(rest_registration("r1", new_sink.addressable()));
        harness.publish(sample_event()).await;

        assert!(new_sink.next().await.is_some());
        assert!(old_sink.is_silent().await);
        harness.stop().await;
    }

    #[tokio::test]
    async fn test_unsupported_update_removes_then_recovers() {
        let mut sink = CaptureSink::start().await;
        let registration = rest_registration("r1", sink.addressable());
        let harness = Harness::start(vec![registration.clone()]);

        harness.save(Registration {
            format: Format::Csv,
            ..registration.clone()
        });
        harness.publish(sample_event()).await;
        assert!(sink.is_silent().await);

        harness.save(registration);
        harness.publish(sample_event()).await;
        assert!(sink.next().await.is_some());
        assert_eq!(harness.stop().await.stopped_actors, 1);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_closing_event_source_drains_and_fails() {
        let harness = Harness::start(vec![rest_registration("r1", unreachable_addressable())]);
        let Harness { handle, task, .. } = harness;
        let DistroHandle {
            events,
            changes: _changes,
            shutdown: _shutdown,
        } = handle;
        drop(events);

        let result = tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(DistroError::EventSourceClosed)));
    }
}
