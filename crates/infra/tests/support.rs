//! Shared helpers for infra integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use paywire_domain::BackendKind;
use paywire_infra::{BackendBuilder, BackendImplementation, LeveledLogger};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};
use wiremock::MockServer;

/// Captured `(level, message)` pairs.
pub type LogRecord = (Level, String);

/// Handle for inspecting events captured during a test.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CapturedLogs {
    /// All captured events in emission order.
    pub fn entries(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Whether an event at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.count(level, needle) > 0
    }

    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.records.lock().iter().filter(|(lvl, msg)| *lvl == level && msg.contains(needle)).count()
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logs.records.lock().push((*event.metadata().level(), visitor.0));
    }
}

/// Captures events on the current thread until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so every event the
/// backend emits during the test lands here.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = Registry::default().with(CaptureLayer { logs: logs.clone() });
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

/// HTTP client that never goes through a proxy from the environment.
pub fn no_proxy_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("test client should build")
}

/// Builder pointed at `server` with sleeps and telemetry off and every
/// transport event enabled.
pub fn backend_builder(kind: BackendKind, server: &MockServer) -> BackendBuilder {
    backend_builder_for_url(kind, &server.uri())
}

/// Same as [`backend_builder`] for a server that is not a WireMock instance.
pub fn backend_builder_for_url(kind: BackendKind, url: &str) -> BackendBuilder {
    BackendImplementation::builder(kind)
        .url(url)
        .http_client(no_proxy_client())
        .network_retries_sleep(false)
        .enable_telemetry(false)
        .logger(LeveledLogger::new(LevelFilter::DEBUG))
}

/// API backend for `server` with the default retry ceiling.
pub fn test_backend(server: &MockServer) -> BackendImplementation {
    backend_builder(BackendKind::Api, server).build().expect("test backend should build")
}
