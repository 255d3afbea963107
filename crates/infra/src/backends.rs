//! Backend registry
//!
//! [`Backends`] holds one backend per [`BackendKind`], built lazily from
//! configuration on first use. Reads take a shared lock; construction takes
//! the write lock and re-checks, so concurrent first calls build once.
//!
//! A process-wide registry backs the free functions at the bottom of this
//! module for callers that do not pass a [`Backends`] around.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use paywire_core::{Backend, RawRequestBackend};
use paywire_domain::{BackendConfig, BackendKind, PaywireConfig, PaywireError, Result};
use tracing::debug;

use crate::http::{BackendBuilder, BackendImplementation};

#[derive(Clone)]
struct BackendSlot {
    backend: Arc<dyn Backend>,
    raw: Option<Arc<dyn RawRequestBackend>>,
}

/// Lazily built backends, one per kind.
pub struct Backends {
    config: PaywireConfig,
    http_client: Option<reqwest::Client>,
    slots: RwLock<HashMap<BackendKind, BackendSlot>>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.slots.read().keys().copied().collect();
        kinds.sort();
        f.debug_struct("Backends").field("initialized", &kinds).finish_non_exhaustive()
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self::new(PaywireConfig::default())
    }
}

impl Backends {
    #[must_use]
    pub fn new(config: PaywireConfig) -> Self {
        Self { config, http_client: None, slots: RwLock::new(HashMap::new()) }
    }

    /// Shares one HTTP client between every backend this registry builds.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PaywireConfig {
        &self.config
    }

    /// Backend for `kind`, building it on first use.
    pub fn get(&self, kind: BackendKind) -> Result<Arc<dyn Backend>> {
        Ok(self.slot(kind)?.backend)
    }

    /// Backend for `kind` as a raw-request backend.
    ///
    /// Fails when the installed backend only implements [`Backend`].
    pub fn get_raw_request(&self, kind: BackendKind) -> Result<Arc<dyn RawRequestBackend>> {
        self.slot(kind)?.raw.ok_or_else(|| {
            PaywireError::Config(
                "cannot call RawRequest if requested backend type is initialized with a backend \
                 that doesn't implement RawRequestBackend"
                    .to_string(),
            )
        })
    }

    /// Installs `backend` for `kind`. Raw requests through it are refused.
    pub fn set(&self, kind: BackendKind, backend: Arc<dyn Backend>) {
        self.slots.write().insert(kind, BackendSlot { backend, raw: None });
    }

    /// Installs a backend that serves both regular and raw requests.
    pub fn set_full<B>(&self, kind: BackendKind, backend: Arc<B>)
    where
        B: Backend + RawRequestBackend + 'static,
    {
        let raw: Arc<dyn RawRequestBackend> = backend.clone();
        self.slots.write().insert(kind, BackendSlot { backend, raw: Some(raw) });
    }

    /// Whether `kind` has been built or installed.
    #[must_use]
    pub fn is_initialized(&self, kind: BackendKind) -> bool {
        self.slots.read().contains_key(&kind)
    }

    fn slot(&self, kind: BackendKind) -> Result<BackendSlot> {
        if let Some(slot) = self.slots.read().get(&kind) {
            return Ok(slot.clone());
        }

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get(&kind) {
            return Ok(slot.clone());
        }

        let backend = Arc::new(self.build(kind, self.config.backend(kind))?);
        debug!(backend = %kind, url = backend.url(), "initialized backend");
        let raw: Arc<dyn RawRequestBackend> = backend.clone();
        let slot = BackendSlot { backend, raw: Some(raw) };
        slots.insert(kind, slot.clone());
        Ok(slot)
    }

    fn build(&self, kind: BackendKind, config: &BackendConfig) -> Result<BackendImplementation> {
        let mut builder = BackendBuilder::from_config(kind, config, self.config.enable_telemetry)?;
        if let Some(client) = &self.http_client {
            builder = builder.http_client(client.clone());
        }
        builder.build()
    }
}

static BACKENDS: Lazy<Backends> = Lazy::new(Backends::default);

/// Process-wide backend for `kind`, built from defaults on first use.
pub fn get_backend(kind: BackendKind) -> Result<Arc<dyn Backend>> {
    BACKENDS.get(kind)
}

/// Replaces the process-wide backend for `kind`.
pub fn set_backend(kind: BackendKind, backend: Arc<dyn Backend>) {
    BACKENDS.set(kind, backend);
}

/// Process-wide backend for `kind` as a raw-request backend.
pub fn get_raw_request_backend(kind: BackendKind) -> Result<Arc<dyn RawRequestBackend>> {
    BACKENDS.get_raw_request(kind)
}

/// Builds a fresh backend from `config`. The process-wide registry is not
/// touched.
pub fn get_backend_with_config(kind: BackendKind, config: &BackendConfig) -> Result<Arc<dyn Backend>> {
    let backend = BackendBuilder::from_config(kind, config, None)?.build()?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaywireConfig {
        let mut config = PaywireConfig::default();
        config.api.url = Some("http://localhost:12111".into());
        config.enable_telemetry = Some(false);
        config
    }

    #[test]
    fn builds_lazily_and_caches() {
        let backends = Backends::new(config());
        assert!(!backends.is_initialized(BackendKind::Api));

        let first = backends.get(BackendKind::Api).unwrap();
        let second = backends.get(BackendKind::Api).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(backends.is_initialized(BackendKind::Api));
        assert!(!backends.is_initialized(BackendKind::Connect));
    }

    #[test]
    fn built_backends_serve_raw_requests() {
        let backends = Backends::new(config());
        assert!(backends.get_raw_request(BackendKind::MeterEvents).is_ok());
    }

    #[test]
    fn set_replaces_and_disables_raw_requests() {
        let backends = Backends::new(config());
        let replacement = get_backend_with_config(BackendKind::Api, &BackendConfig::default()).unwrap();
        backends.set(BackendKind::Api, replacement.clone());

        assert!(Arc::ptr_eq(&backends.get(BackendKind::Api).unwrap(), &replacement));
        match backends.get_raw_request(BackendKind::Api) {
            Err(err) => assert!(err.to_string().contains("doesn't implement RawRequestBackend")),
            Ok(_) => panic!("expected raw requests to be refused"),
        }
    }

    #[test]
    fn invalid_config_surfaces_on_first_use() {
        let mut config = config();
        config.connect.log_level = Some("chatty".into());
        let backends = Backends::new(config);
        assert!(matches!(backends.get(BackendKind::Connect), Err(PaywireError::Config(_))));
        assert!(!backends.is_initialized(BackendKind::Connect));
    }

    #[test]
    fn with_config_is_never_cached() {
        let config = BackendConfig::default();
        let a = get_backend_with_config(BackendKind::Uploads, &config).unwrap();
        let b = get_backend_with_config(BackendKind::Uploads, &config).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
