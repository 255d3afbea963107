use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt};
use paywire_common::form::Values;
use paywire_common::idempotency::{new_idempotency_key, normalize_idempotency_key};
use paywire_common::resilience::{
    parse_should_retry_hint, should_retry, AttemptOutcome, CallState, NetworkBackoff,
    RetryDecision, StopReason,
};
use paywire_core::{
    extract_params, Backend, LastResponseSetter, Params, ParamsContainer, RawParams,
    ByteStream, RawRequestBackend, StreamingApiResponse, StreamingLastResponseSetter,
};
use paywire_domain::constants::{
    API_VERSION, DEFAULT_MAX_NETWORK_RETRIES, FORM_CONTENT_TYPE, HEADER_AUTHORIZATION,
    HEADER_CLIENT_TELEMETRY, HEADER_CLIENT_USER_AGENT, HEADER_CONTENT_TYPE,
    HEADER_IDEMPOTENCY_KEY, HEADER_REQUEST_ID, HEADER_SHOULD_RETRY, HEADER_STRIPE_ACCOUNT,
    HEADER_STRIPE_CONTEXT, HEADER_STRIPE_VERSION, HEADER_USER_AGENT, MULTIPART_CONTENT_TYPE,
    RAW_REQUEST_USAGE,
};
use paywire_domain::{
    ApiMode, ApiResponse, AppInfo, BackendConfig, BackendKind, HeaderValues, HttpMethod,
    PaywireError, Result,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Request, Response, StatusCode, Url};

use crate::api::errors::{decode_error, log_api_error, response_to_error};
use crate::errors::{classify_transport_error, InfraError};
use crate::logging::{log_debug, log_error, log_info, log_warn, LeveledLogger};
use crate::telemetry::{telemetry_enabled, TelemetryBuffer};
use crate::user_agent::{encoded_client_user_agent, encoded_user_agent};

/// reqwest-backed implementation of [`Backend`] and [`RawRequestBackend`].
///
/// One instance serves one [`BackendKind`]. It is shared behind an `Arc` and
/// only the retry ceiling changes after construction.
#[derive(Debug)]
pub struct BackendImplementation {
    kind: BackendKind,
    url: String,
    http: ReqwestClient,
    max_network_retries: AtomicU32,
    backoff: NetworkBackoff,
    logger: LeveledLogger,
    telemetry: TelemetryBuffer,
    user_agent: String,
    client_user_agent: String,
}

/// How the body of a successful response is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyMode {
    Buffered,
    Streaming,
}

enum ReplyBody {
    Buffered(Vec<u8>),
    Streaming(Response),
}

/// A response that ended the retry loop successfully.
struct Reply {
    status_code: u16,
    status: String,
    headers: HeaderValues,
    body: ReplyBody,
    duration: Duration,
}

/// Result of one attempt, before the retry decision.
enum Attempt {
    Success(Reply),
    Failed { status_code: u16, should_retry: Option<bool>, error: PaywireError },
    Transport(reqwest::Error),
}

impl BackendImplementation {
    /// Start building a backend for `kind`.
    pub fn builder(kind: BackendKind) -> BackendBuilder {
        BackendBuilder::new(kind)
    }

    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Base URL without a trailing `/` or `/v1`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn max_network_retries(&self) -> u32 {
        self.max_network_retries.load(Ordering::Relaxed)
    }

    #[must_use]
    pub const fn logger(&self) -> &LeveledLogger {
        &self.logger
    }

    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryBuffer {
        &self.telemetry
    }

    /// Builds a request with every default header attached.
    ///
    /// The telemetry header is not part of this; it is attached once per
    /// logical call when the request is executed.
    pub fn new_request(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
        params: Option<&Params>,
    ) -> Result<Request> {
        let full = if path.starts_with('/') {
            format!("{}{path}", self.url)
        } else {
            format!("{}/{path}", self.url)
        };
        let url = Url::parse(&full).map_err(|err| {
            log_error!(self.logger, "Cannot create Stripe request: {err}");
            PaywireError::Validation(format!("invalid request URL {full}: {err}"))
        })?;

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HEADER_AUTHORIZATION, &format!("Bearer {key}"))?;
        insert_header(&mut headers, HEADER_CONTENT_TYPE, content_type)?;
        insert_header(&mut headers, HEADER_STRIPE_VERSION, API_VERSION)?;
        insert_header(&mut headers, HEADER_USER_AGENT, &self.user_agent)?;
        insert_header(&mut headers, HEADER_CLIENT_USER_AGENT, &self.client_user_agent)?;

        match params.and_then(|p| p.idempotency_key.as_deref()) {
            Some(supplied) => {
                let idempotency_key = normalize_idempotency_key(supplied)
                    .map_err(|err| PaywireError::Validation(err.to_string()))?;
                insert_header(&mut headers, HEADER_IDEMPOTENCY_KEY, &idempotency_key)?;
            }
            None if method.is_write() => {
                insert_header(&mut headers, HEADER_IDEMPOTENCY_KEY, &new_idempotency_key())?;
            }
            None => {}
        }

        if let Some(params) = params {
            if let Some(account) = params.stripe_account.as_deref() {
                insert_header(&mut headers, HEADER_STRIPE_ACCOUNT, account.trim())?;
            }

            // Caller headers replace the defaults above.
            for (name, values) in &params.headers {
                let name = header_name(name)?;
                headers.remove(&name);
                for value in values {
                    headers.append(name.clone(), header_value(value)?);
                }
            }
        }

        let mut request = Request::new(to_reqwest_method(method), url);
        *request.headers_mut() = headers;
        if !body.is_empty() {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// Runs `request` until it succeeds or the retry policy stops.
    ///
    /// Error responses are always buffered so they can be decoded. On success
    /// a telemetry sample is recorded with `usage`.
    async fn execute(
        &self,
        mut request: Request,
        params: Option<&Params>,
        usage: &[String],
        mode: BodyMode,
    ) -> Result<Reply> {
        let method = request.method().clone();
        let target = format!(
            "{}{}",
            request.url().host_str().unwrap_or_default(),
            request.url().path()
        );
        log_info!(
            self.logger,
            backend = %self.kind,
            method = %method,
            "Requesting {method} {target}"
        );
        self.attach_telemetry(&mut request);

        let max_retries = self.max_network_retries();
        let mut retries: u32 = 0;
        loop {
            let attempt_request = request.try_clone().ok_or_else(|| {
                PaywireError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let start = Instant::now();
            let attempt = interruptible(params, self.attempt(attempt_request, mode, start)).await?;
            log_info!(
                self.logger,
                retry = retries,
                "Request completed in {:?} (retry: {retries})",
                start.elapsed()
            );

            let call_state = params.map_or(CallState::Active, Params::call_state);
            let decision = match &attempt {
                Attempt::Success(_) => RetryDecision::Stop(StopReason::Succeeded),
                Attempt::Failed { status_code, should_retry: hint, error } => {
                    let outcome = AttemptOutcome::Response {
                        status: *status_code,
                        should_retry: *hint,
                        error_code: error.code(),
                    };
                    should_retry(&outcome, call_state, retries, max_retries)
                }
                Attempt::Transport(err) => {
                    let outcome = AttemptOutcome::Transport(classify_transport_error(err));
                    should_retry(&outcome, call_state, retries, max_retries)
                }
            };

            match decision {
                RetryDecision::Stop(reason) => {
                    if reason != StopReason::Succeeded {
                        log_info!(self.logger, "Not retrying request: {reason}");
                    }
                    return self.finish(attempt, params, usage);
                }
                RetryDecision::Retry => {
                    let delay = self.backoff.delay(retries);
                    retries += 1;
                    log_warn!(
                        self.logger,
                        retry = retries,
                        "Initiating retry {retries} for request {method} {target} after sleeping {delay:?}"
                    );
                    if !delay.is_zero() {
                        interruptible(params, tokio::time::sleep(delay)).await?;
                    }
                }
            }
        }
    }

    async fn attempt(&self, request: Request, mode: BodyMode, start: Instant) -> Attempt {
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                log_error!(self.logger, "Request failed with error: {err}");
                return Attempt::Transport(err);
            }
        };

        let status_code = response.status().as_u16();
        let status = status_line(response.status());
        let headers = header_values(response.headers());

        if status_code < 400 && mode == BodyMode::Streaming {
            return Attempt::Success(Reply {
                status_code,
                status,
                headers,
                body: ReplyBody::Streaming(response),
                duration: start.elapsed(),
            });
        }

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                log_error!(self.logger, "Request failed with error: {err}");
                return Attempt::Transport(err);
            }
        };
        let duration = start.elapsed();

        if status_code < 400 {
            return Attempt::Success(Reply {
                status_code,
                status,
                headers,
                body: ReplyBody::Buffered(body),
                duration,
            });
        }

        let hint = parse_should_retry_hint(first_header(&headers, HEADER_SHOULD_RETRY));
        let error = response_to_error(self.kind, status_code, &status, headers, body, duration);
        log_api_error(&self.logger, status_code, &error);
        Attempt::Failed { status_code, should_retry: hint, error }
    }

    fn finish(&self, attempt: Attempt, params: Option<&Params>, usage: &[String]) -> Result<Reply> {
        match attempt {
            Attempt::Success(reply) => {
                let request_id = first_header(&reply.headers, HEADER_REQUEST_ID);
                let usage = if usage.is_empty() { params.map_or(&[][..], Params::usage) } else { usage };
                self.telemetry.record(request_id, Some(reply.duration), usage);
                Ok(reply)
            }
            Attempt::Failed { error, .. } => Err(error),
            Attempt::Transport(err) => Err(InfraError::from(err).into()),
        }
    }

    fn attach_telemetry(&self, request: &mut Request) {
        match self.telemetry.next_header() {
            Some(Ok(payload)) => {
                match (header_name(HEADER_CLIENT_TELEMETRY), header_value(&payload)) {
                    (Ok(name), Ok(value)) => {
                        request.headers_mut().insert(name, value);
                    }
                    (Err(err), _) | (_, Err(err)) => {
                        log_warn!(self.logger, "Unable to encode client telemetry: {err}");
                    }
                }
            }
            Some(Err(err)) => {
                log_warn!(self.logger, "Unable to encode client telemetry: {err}");
            }
            None => {}
        }
    }

    /// Executes a buffered request and decodes the body into `target`.
    async fn do_buffered(
        &self,
        request: Request,
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        let reply = self.execute(request, params, &[], BodyMode::Buffered).await?;
        let response = into_api_response(reply);
        log_debug!(self.logger, "Response: {}", response.body_text());

        let decoded = target
            .decode_body(&response.raw_json)
            .map_err(|err| decode_error(response.status_code, &response.raw_json, &err));
        target.set_last_response(response);
        if let Err(err) = &decoded {
            log_error!(self.logger, "{err}");
        }
        decoded
    }
}

#[async_trait]
impl Backend for BackendImplementation {
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        let (values, common) = extract_params(params)?;
        self.call_raw(method, path, key, values.as_ref(), common, target).await
    }

    async fn call_streaming(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        params: Option<&dyn ParamsContainer>,
        target: &mut dyn StreamingLastResponseSetter,
    ) -> Result<()> {
        let (values, common) = extract_params(params)?;

        let mut path = path.to_string();
        let mut body = String::new();
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            body = values.encode();
            if method == HttpMethod::Get {
                path = format!("{path}?{body}");
                body.clear();
            }
        }

        let request =
            self.new_request(method, &path, key, FORM_CONTENT_TYPE, body.into_bytes(), common)?;
        let reply = self.execute(request, common, &[], BodyMode::Streaming).await?;
        target.set_last_response(into_streaming_response(reply, common));
        Ok(())
    }

    async fn call_raw(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        body: Option<&Values>,
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        let mut path = path.to_string();
        let mut encoded = String::new();
        if let Some(values) = body.filter(|v| !v.is_empty()) {
            validate_method(method)?;
            encoded = values.encode();
            if method != HttpMethod::Post {
                path = format!("{path}?{encoded}");
                encoded.clear();
            }
        }

        let request =
            self.new_request(method, &path, key, FORM_CONTENT_TYPE, encoded.into_bytes(), params)?;
        self.do_buffered(request, params, target).await
    }

    async fn call_multipart(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        boundary: &str,
        body: &[u8],
        params: Option<&Params>,
        target: &mut dyn LastResponseSetter,
    ) -> Result<()> {
        let content_type = format!("{MULTIPART_CONTENT_TYPE}; boundary={boundary}");
        let request = self.new_request(method, path, key, &content_type, body.to_vec(), params)?;
        self.do_buffered(request, params, target).await
    }

    fn set_max_network_retries(&self, max_network_retries: u32) {
        self.max_network_retries.store(max_network_retries, Ordering::Relaxed);
    }
}

#[async_trait]
impl RawRequestBackend for BackendImplementation {
    async fn raw_request(
        &self,
        method: HttpMethod,
        path: &str,
        key: &str,
        content: &str,
        params: Option<&RawParams>,
    ) -> Result<ApiResponse> {
        validate_method(method)?;
        let mode = ApiMode::from_path(path)
            .ok_or_else(|| PaywireError::Validation(format!("Unknown path prefix {path}")))?;

        let (_, common) = extract_params(params.map(|p| p as &dyn ParamsContainer))?;
        let mut request = self.new_request(
            method,
            path,
            key,
            mode.content_type(),
            content.as_bytes().to_vec(),
            common,
        )?;
        if let Some(context) = params.and_then(|p| p.stripe_context.as_deref()).filter(|c| !c.is_empty()) {
            request.headers_mut().insert(header_name(HEADER_STRIPE_CONTEXT)?, header_value(context)?);
        }

        let usage = [RAW_REQUEST_USAGE.to_string()];
        let reply = self.execute(request, common, &usage, BodyMode::Buffered).await?;
        Ok(into_api_response(reply))
    }
}

/// Builder for [`BackendImplementation`].
#[derive(Debug)]
pub struct BackendBuilder {
    kind: BackendKind,
    url: Option<String>,
    http_client: Option<ReqwestClient>,
    http_timeout: Duration,
    max_network_retries: u32,
    enable_telemetry: bool,
    logger: LeveledLogger,
    app_info: Option<AppInfo>,
    backoff: NetworkBackoff,
}

impl BackendBuilder {
    pub fn new(kind: BackendKind) -> Self {
        let defaults = BackendConfig::default();
        Self {
            kind,
            url: None,
            http_client: None,
            http_timeout: defaults.http_timeout(),
            max_network_retries: DEFAULT_MAX_NETWORK_RETRIES,
            enable_telemetry: telemetry_enabled(),
            logger: LeveledLogger::default(),
            app_info: None,
            backoff: NetworkBackoff::default(),
        }
    }

    /// Builder seeded from configuration.
    ///
    /// Telemetry comes from the backend setting, then `global_telemetry`, then
    /// the process-wide toggle.
    pub fn from_config(
        kind: BackendKind,
        config: &BackendConfig,
        global_telemetry: Option<bool>,
    ) -> Result<Self> {
        let logger = LeveledLogger::from_name(config.log_level.as_deref())?;
        let mut builder = Self::new(kind)
            .url(config.resolved_url(kind))
            .http_timeout(config.http_timeout())
            .max_network_retries(config.max_network_retries())
            .logger(logger);
        if let Some(enabled) = config.enable_telemetry.or(global_telemetry) {
            builder = builder.enable_telemetry(enabled);
        }
        if let Some(info) = &config.app_info {
            builder = builder.app_info(info.clone());
        }
        Ok(builder)
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Shared HTTP client. Its own timeout applies instead of `http_timeout`.
    pub fn http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn max_network_retries(mut self, retries: u32) -> Self {
        self.max_network_retries = retries;
        self
    }

    pub fn enable_telemetry(mut self, enabled: bool) -> Self {
        self.enable_telemetry = enabled;
        self
    }

    pub fn logger(mut self, logger: LeveledLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn app_info(mut self, app_info: AppInfo) -> Self {
        self.app_info = Some(app_info);
        self
    }

    /// Turns retry sleeps on or off. Tests switch them off.
    pub fn network_retries_sleep(mut self, enabled: bool) -> Self {
        self.backoff = self.backoff.with_sleep(enabled);
        self
    }

    pub fn backoff(mut self, backoff: NetworkBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn build(self) -> Result<BackendImplementation> {
        if let Some(info) = &self.app_info {
            info.validate()?;
        }

        let http = match self.http_client {
            Some(client) => client,
            None => ReqwestClient::builder()
                .timeout(self.http_timeout)
                .build()
                .map_err(|err| PaywireError::from(InfraError::from(err)))?,
        };

        let url = self.url.map_or_else(
            || self.kind.default_url().to_string(),
            |url| paywire_domain::normalize_base_url(&url),
        );
        let client_user_agent = encoded_client_user_agent(self.app_info.as_ref())
            .map_err(|err| PaywireError::Internal(format!("cannot encode client user agent: {err}")))?;

        Ok(BackendImplementation {
            kind: self.kind,
            url,
            http,
            max_network_retries: AtomicU32::new(self.max_network_retries),
            backoff: self.backoff,
            logger: self.logger,
            telemetry: TelemetryBuffer::new(self.enable_telemetry),
            user_agent: encoded_user_agent(self.app_info.as_ref()),
            client_user_agent,
        })
    }
}

/// The API only accepts GET, POST and DELETE.
fn validate_method(method: HttpMethod) -> Result<()> {
    match method {
        HttpMethod::Get | HttpMethod::Post | HttpMethod::Delete => Ok(()),
        other => Err(PaywireError::Validation(format!(
            "method must be POST, GET, or DELETE. Received {other}"
        ))),
    }
}

/// Races `fut` against the call's cancellation token and deadline.
async fn interruptible<F: Future>(params: Option<&Params>, fut: F) -> Result<F::Output> {
    let token = params.and_then(|p| p.cancellation.as_ref());
    let deadline = params.and_then(|p| p.deadline);

    let cancelled = async {
        match token {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        () = cancelled => Err(PaywireError::Cancelled),
        () = expired => Err(PaywireError::DeadlineExceeded),
        output = fut => Ok(output),
    }
}

/// Ends `body` with the same errors as [`interruptible`] once the token is
/// cancelled or the deadline passes, even while a chunk read is pending.
fn interruptible_stream(body: ByteStream, params: Option<&Params>) -> ByteStream {
    let token = params.and_then(|p| p.cancellation.clone());
    let deadline = params.and_then(|p| p.deadline);
    if token.is_none() && deadline.is_none() {
        return body;
    }

    let interrupt: BoxFuture<'static, PaywireError> = async move {
        let cancelled = async {
            match &token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            () = cancelled => PaywireError::Cancelled,
            () = expired => PaywireError::DeadlineExceeded,
        }
    }
    .boxed();

    futures::stream::unfold(Some((body, interrupt)), |state| async move {
        let (mut body, mut interrupt) = state?;
        tokio::select! {
            biased;
            err = &mut interrupt => Some((Err(err), None)),
            next = body.next() => next.map(|item| (item, Some((body, interrupt)))),
        }
    })
    .boxed()
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|err| PaywireError::Validation(format!("invalid header name {name}: {err}")))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|err| PaywireError::Validation(format!("invalid header value: {err}")))
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    headers.insert(header_name(name)?, header_value(value)?);
    Ok(())
}

/// `200 OK` style status line.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

/// First value of a response header. Keys are stored lowercase.
fn first_header<'a>(headers: &'a HeaderValues, name: &str) -> Option<&'a str> {
    headers.get(&name.to_ascii_lowercase()).and_then(|values| values.first()).map(String::as_str)
}

fn header_values(headers: &HeaderMap) -> HeaderValues {
    let mut values = HeaderValues::new();
    for (name, value) in headers {
        values
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    values
}

fn into_api_response(reply: Reply) -> ApiResponse {
    let body = match reply.body {
        ReplyBody::Buffered(body) => body,
        ReplyBody::Streaming(_) => Vec::new(),
    };
    ApiResponse::new(reply.status_code, reply.status, reply.headers, body, reply.duration)
}

fn into_streaming_response(reply: Reply, params: Option<&Params>) -> StreamingApiResponse {
    let envelope = ApiResponse::new(
        reply.status_code,
        reply.status,
        reply.headers,
        Vec::new(),
        reply.duration,
    );
    let body = match reply.body {
        ReplyBody::Streaming(response) => interruptible_stream(
            response
                .bytes_stream()
                .map_ok(|chunk| chunk.to_vec())
                .map_err(|err| PaywireError::from(InfraError::from(err)))
                .boxed(),
            params,
        ),
        ReplyBody::Buffered(body) => {
            futures::stream::once(async move { Ok::<_, PaywireError>(body) }).boxed()
        }
    };
    StreamingApiResponse {
        headers: envelope.headers,
        idempotency_key: envelope.idempotency_key,
        body,
        request_id: envelope.request_id,
        status: envelope.status,
        status_code: envelope.status_code,
        duration: envelope.duration,
    }
}
