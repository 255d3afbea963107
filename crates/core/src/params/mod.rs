//! Per-call request parameters
//!
//! Every operation takes a parameter struct that embeds [`Params`] (or
//! [`ListParams`] for list endpoints). The embedded value carries everything
//! that is not part of the request body: cancellation, idempotency key,
//! connected account, extra headers. The deprecated `expand` and `metadata`
//! fields are still form-encoded for callers that use them.

mod extract;
mod list;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use paywire_common::form::{append_field, ExtraValues, FormEncode, Values};
use paywire_common::resilience::CallState;
use paywire_domain::HeaderValues;
use tokio_util::sync::CancellationToken;

pub use extract::{extract_params, ParamsContainer};
pub use list::{ListParams, ListParamsContainer};

/// Common parameters shared by every request.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Cancels in-flight attempts and retry sleeps when triggered.
    ///
    /// A cancelled call gives no guarantee about whether the operation ran on
    /// the server. Retry with the same idempotency key to find out.
    pub cancellation: Option<CancellationToken>,
    /// Instant after which the call is abandoned.
    pub deadline: Option<Instant>,
    /// Deprecated: set `expand` on the surrounding struct instead.
    pub expand: Option<Vec<String>>,
    /// Pairs not modelled by the typed parameter struct.
    pub extra: Option<ExtraValues>,
    /// Extra request headers. They override the defaults on conflict.
    pub headers: HeaderValues,
    /// Sent as `Idempotency-Key`; generated for write methods when unset.
    pub idempotency_key: Option<String>,
    /// Deprecated: set `metadata` on the surrounding struct instead.
    pub metadata: Option<BTreeMap<String, String>>,
    /// Connected account the request is made on behalf of.
    pub stripe_account: Option<String>,
    usage: Vec<String>,
}

impl Params {
    /// Empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a cancellation token to the call.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Abandons the call at `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abandons the call `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Deprecated: use `add_expand` on the surrounding struct instead.
    pub fn add_expand(&mut self, field: impl Into<String>) {
        self.expand.get_or_insert_with(Vec::new).push(field.into());
    }

    /// Adds a raw form pair to the request body.
    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.get_or_insert_with(ExtraValues::new).add(key, value);
    }

    /// Deprecated: use `add_metadata` on the surrounding struct instead.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());
    }

    /// Adds a header value. Repeated names keep every value.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.entry(name.into()).or_default().push(value.into());
    }

    pub fn set_idempotency_key(&mut self, key: impl Into<String>) {
        self.idempotency_key = Some(key.into());
    }

    pub fn set_stripe_account(&mut self, account: impl Into<String>) {
        self.stripe_account = Some(account.into());
    }

    /// Tags the call with the library features that produced it. Reported in
    /// client telemetry.
    pub fn set_usage(&mut self, usage: Vec<String>) {
        self.usage = usage;
    }

    /// Usage tags reported in client telemetry.
    #[must_use]
    pub fn usage(&self) -> &[String] {
        &self.usage
    }

    /// Whether the caller has given up on this call.
    #[must_use]
    pub fn call_state(&self) -> CallState {
        if self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            CallState::Cancelled
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            CallState::DeadlineExceeded
        } else {
            CallState::Active
        }
    }
}

impl FormEncode for Params {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "expand", &self.expand);
        append_field(values, keys, "metadata", &self.metadata);
        if let Some(extra) = &self.extra {
            extra.append_to(values, keys);
        }
    }
}

impl ParamsContainer for Params {
    fn params(&self) -> &Params {
        self
    }
}

/// Parameters of a raw request.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    pub params: Params,
    /// Sent as `Stripe-Context` when set.
    pub stripe_context: Option<String>,
}

impl FormEncode for RawParams {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        self.params.append_to(values, keys);
    }
}

impl ParamsContainer for RawParams {
    fn params(&self) -> &Params {
        &self.params
    }
}
