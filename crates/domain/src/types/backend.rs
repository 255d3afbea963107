//! Backend identities, HTTP verbs and API modes

use serde::{Deserialize, Serialize};

use crate::constants::{
    API_URL, CONNECT_URL, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, METER_EVENTS_URL, UPLOADS_URL,
};
use crate::impl_wire_name_conversions;

/// Named endpoint a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Primary REST API.
    Api,
    /// OAuth / Connect endpoint. Errors come back in a flat shape.
    Connect,
    /// File uploads.
    Uploads,
    /// High-throughput metered events.
    #[serde(rename = "meterevents")]
    MeterEvents,
}

impl_wire_name_conversions!(BackendKind {
    Api => "api",
    Connect => "connect",
    Uploads => "uploads",
    MeterEvents => "meterevents",
});

impl BackendKind {
    /// Every backend kind, in registry order.
    pub const ALL: [Self; 4] = [Self::Api, Self::Connect, Self::Uploads, Self::MeterEvents];

    /// Base URL used when no override is configured.
    #[must_use]
    pub const fn default_url(self) -> &'static str {
        match self {
            Self::Api => API_URL,
            Self::Connect => CONNECT_URL,
            Self::Uploads => UPLOADS_URL,
            Self::MeterEvents => METER_EVENTS_URL,
        }
    }

    /// Whether error bodies from this backend use the flat OAuth shape.
    #[must_use]
    pub const fn uses_flat_errors(self) -> bool {
        matches!(self, Self::Connect)
    }
}

/// HTTP verb of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl_wire_name_conversions!(HttpMethod {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Patch => "PATCH",
    Delete => "DELETE",
});

impl HttpMethod {
    /// Write verbs get an idempotency key when the caller supplied none.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

/// Version family of an endpoint, decided by its path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// `/v1` endpoints take form-encoded bodies.
    V1,
    /// `/v2` endpoints take JSON bodies.
    V2,
}

impl_wire_name_conversions!(ApiMode {
    V1 => "v1",
    V2 => "v2",
});

impl ApiMode {
    /// Mode of a request path, or `None` for an unknown prefix.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        if path.starts_with("/v1") {
            Some(Self::V1)
        } else if path.starts_with("/v2") {
            Some(Self::V2)
        } else {
            None
        }
    }

    /// Content type of request bodies in this mode.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::V1 => FORM_CONTENT_TYPE,
            Self::V2 => JSON_CONTENT_TYPE,
        }
    }
}
