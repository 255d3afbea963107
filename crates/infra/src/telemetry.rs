//! Client telemetry
//!
//! After a successful call the backend records the request id and duration;
//! the next call pops one sample and reports it in
//! `X-Stripe-Client-Telemetry`. The buffer never blocks: when it is full the
//! newest sample is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use paywire_common::collections::BoundedQueue;
use paywire_domain::constants::TELEMETRY_BUFFER_SIZE;
use paywire_domain::{RequestMetrics, RequestTelemetry};

static TELEMETRY_ENABLED: AtomicBool = AtomicBool::new(true);

/// Process-wide default for backends that do not configure telemetry.
pub fn set_telemetry_enabled(enabled: bool) {
    TELEMETRY_ENABLED.store(enabled, Ordering::Relaxed);
}

#[must_use]
pub fn telemetry_enabled() -> bool {
    TELEMETRY_ENABLED.load(Ordering::Relaxed)
}

/// Bounded buffer of pending samples. Holds no queue when disabled.
#[derive(Debug, Clone)]
pub struct TelemetryBuffer {
    queue: Option<BoundedQueue<RequestMetrics>>,
}

impl TelemetryBuffer {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { queue: enabled.then(|| BoundedQueue::new(TELEMETRY_BUFFER_SIZE)) }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.queue.is_some()
    }

    /// Pending samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.as_ref().map_or(0, BoundedQueue::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores a sample. Returns whether it was kept.
    ///
    /// Nothing is stored without a request id, or without either a duration
    /// or usage tags.
    pub fn record(&self, request_id: Option<&str>, duration: Option<Duration>, usage: &[String]) -> bool {
        let Some(queue) = &self.queue else {
            return false;
        };
        let Some(request_id) = request_id.filter(|id| !id.is_empty()) else {
            return false;
        };
        if duration.is_none() && usage.is_empty() {
            return false;
        }

        let metrics = RequestMetrics {
            request_duration_ms: duration
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            request_id: request_id.to_string(),
            usage: (!usage.is_empty()).then(|| usage.to_vec()),
        };
        queue.try_push(metrics).is_ok()
    }

    /// Pops the oldest sample and renders it as a header value.
    pub fn next_header(&self) -> Option<Result<String, serde_json::Error>> {
        let metrics = self.queue.as_ref()?.try_pop()?;
        Some(serde_json::to_string(&RequestTelemetry::from(metrics)))
    }
}
