//! Transport data types

pub mod app_info;
pub mod backend;
pub mod response;
pub mod telemetry;

pub use app_info::AppInfo;
pub use backend::{ApiMode, BackendKind, HttpMethod};
pub use response::{ApiResponse, HeaderValues};
pub use telemetry::{RequestMetrics, RequestTelemetry};
