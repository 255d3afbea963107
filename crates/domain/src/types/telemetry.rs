//! Telemetry payloads carried in the client telemetry header

use serde::{Deserialize, Serialize};

/// Metrics of one completed request, replayed on a later request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_duration_ms: Option<u64>,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Vec<String>>,
}

/// Header payload wrapping the previous request's metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTelemetry {
    pub last_request_metrics: RequestMetrics,
}

impl From<RequestMetrics> for RequestTelemetry {
    fn from(last_request_metrics: RequestMetrics) -> Self {
        Self { last_request_metrics }
    }
}
