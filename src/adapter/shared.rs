//! State and transport plumbing shared by the vendor adapters
//!
//! Each adapter owns one [`AdapterCore`]: the lazily built transport, the
//! token cache behind it and the connection status.

use super::result::{ConnectionStatus, OperationResult};
use crate::auth::TokenCache;
use crate::config::ConnectionProfile;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, HttpResponse, RequestConfig, HEALTH_CHECK_TIMEOUT};
use crate::query::{FilterTranslator, QuerySpec, VendorQuery};
use crate::types::{JsonValue, Method, SystemKind};
use std::borrow::Cow;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub(crate) struct AdapterCore {
    system: SystemKind,
    http_config: HttpClientConfig,
    auth: Arc<TokenCache>,
    client: Mutex<Option<Arc<HttpClient>>>,
    status: AtomicU8,
}

impl AdapterCore {
    /// Core for `profile`, with extra default headers on top of the JSON defaults
    pub(crate) fn new(profile: &ConnectionProfile, extra_headers: &[(&str, &str)]) -> Self {
        let mut builder = HttpClientConfig::builder()
            .base_url(profile.base_url.trim_end_matches('/'))
            .timeout(profile.options.timeout());
        for (key, value) in extra_headers {
            builder = builder.header(*key, *value);
        }

        Self {
            system: profile.system,
            http_config: builder.build(),
            auth: Arc::new(TokenCache::from_config(
                &profile.auth,
                profile.options.timeout(),
            )),
            client: Mutex::new(None),
            status: AtomicU8::new(ConnectionStatus::Disconnected.as_u8()),
        }
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status.store(status.as_u8(), Ordering::SeqCst);
    }

    /// The transport, built on first use
    async fn client(&self) -> Result<Arc<HttpClient>> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }
        let client = Arc::new(HttpClient::with_auth(
            self.http_config.clone(),
            Arc::clone(&self.auth),
        )?);
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Drop the transport and the cached token
    pub(crate) async fn reset(&self) {
        *self.client.lock().await = None;
        self.auth.clear().await;
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Send one request; any status comes back as a response
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestConfig,
    ) -> Result<HttpResponse> {
        let client = self.client().await?;
        match client.request(method.into(), path, request).await {
            Err(e) if e.is_auth_failure() => {
                warn!("{} credential acquisition failed: {}", self.system.display_name(), e);
                self.set_status(ConnectionStatus::Error);
                Err(e)
            }
            other => other,
        }
    }

    /// Send one request and fail on any non-2xx status
    pub(crate) async fn send_ok(
        &self,
        method: Method,
        path: &str,
        request: RequestConfig,
    ) -> Result<HttpResponse> {
        self.send(method, path, request).await?.error_for_status()
    }

    /// GET and parse a JSON body
    pub(crate) async fn get_json(&self, path: &str, request: RequestConfig) -> Result<JsonValue> {
        self.send_ok(Method::GET, path, request).await?.json()
    }

    // ========================================================================
    // Shared operations
    // ========================================================================

    /// Fresh transport and token, then probe `path`
    pub(crate) async fn connect(&self, path: &str) -> OperationResult {
        self.reset().await;
        let name = self.system.display_name();
        let request = RequestConfig::new().timeout(HEALTH_CHECK_TIMEOUT);

        match self.send(Method::GET, path, request).await {
            Ok(response) if response.status() < 400 => {
                self.set_status(ConnectionStatus::Connected);
                info!("Connected to {}", name);
                OperationResult::ok().with_message(format!("Connected to {name}"))
            }
            Ok(response) => {
                self.set_status(ConnectionStatus::Error);
                let status = response.status();
                warn!("{} connect probe returned {}", name, status);
                OperationResult::failure(format!("{name} returned {status}"))
                    .with_metadata("status", status)
                    .with_metadata(
                        "retryable",
                        Error::http_status(status, "").is_retryable(),
                    )
            }
            Err(e) => {
                self.set_status(ConnectionStatus::Error);
                warn!("{} connect failed: {}", name, e);
                OperationResult::from_error(&e)
            }
        }
    }

    /// Drop transport and token, mark disconnected
    pub(crate) async fn disconnect(&self) -> OperationResult {
        self.reset().await;
        self.set_status(ConnectionStatus::Disconnected);
        let name = self.system.display_name();
        info!("Disconnected from {}", name);
        OperationResult::ok().with_message(format!("Disconnected from {name}"))
    }

    /// GET `path` with the health-check timeout; below 400 is healthy
    pub(crate) async fn health_check(&self, path: &str) -> OperationResult {
        let request = RequestConfig::new().timeout(HEALTH_CHECK_TIMEOUT);
        match self.send(Method::GET, path, request).await {
            Ok(response) if response.status() < 400 => OperationResult::ok()
                .with_message("healthy")
                .with_metadata("status", response.status()),
            Ok(response) => OperationResult::failure(format!("status {}", response.status()))
                .with_metadata("status", response.status()),
            Err(e) => OperationResult::from_error(&e),
        }
    }

    /// Passthrough request. Non-2xx is a failure carrying status and body.
    pub(crate) async fn raw(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
        headers: Vec<(String, String)>,
    ) -> Result<OperationResult> {
        let mut request = RequestConfig::new();
        request.headers = headers;
        request.body = body;

        let response = self.send(method, path, request).await?;
        let status = response.status();
        if !response.is_success() {
            let err = Error::http_status(status, response.text());
            return Ok(OperationResult::from_error(&err).with_metadata("status", status));
        }
        Ok(OperationResult::success(response.json_or_text()).with_metadata("status", status))
    }
}

impl std::fmt::Debug for AdapterCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterCore")
            .field("system", &self.system)
            .field("base_url", &self.http_config.base_url)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Translate `spec`, then run the vendor call.
///
/// A failed call still reports the rendered query in its metadata.
pub(crate) async fn run_query<F, Fut>(
    translator: &dyn FilterTranslator,
    spec: &QuerySpec,
    run: F,
) -> OperationResult
where
    F: FnOnce(VendorQuery) -> Fut,
    Fut: Future<Output = Result<OperationResult>>,
{
    let query = match translator.translate(spec) {
        Ok(query) => query,
        Err(e) => return OperationResult::from_error(&e),
    };
    let rendered = query.rendered();
    match run(query).await {
        Ok(result) => result,
        Err(e) => OperationResult::from_error(&e).with_metadata("query", rendered),
    }
}

/// Parse a raw-call method name, or produce the failure to return
pub(crate) fn parse_method(method: &str) -> std::result::Result<Method, OperationResult> {
    method
        .parse::<Method>()
        .map_err(|e| OperationResult::from_error(&e))
}

/// Percent-encode a record id for use as one path segment
pub(crate) fn encode_id(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Read a count that may arrive as a number or a numeric string
pub(crate) fn count_value(value: Option<&JsonValue>) -> JsonValue {
    match value {
        Some(JsonValue::Number(n)) => JsonValue::Number(n.clone()),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_or_else(|_| JsonValue::String(s.clone()), JsonValue::from),
        _ => JsonValue::Null,
    }
}

/// Array at `key` of a JSON object, or empty
pub(crate) fn array_at(body: &JsonValue, key: &str) -> Vec<JsonValue> {
    body.get(key)
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default()
}

/// String at `key`, or `default`
pub(crate) fn str_at<'a>(value: &'a JsonValue, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(JsonValue::as_str).unwrap_or(default)
}

/// Bool at `key`, or `default`
pub(crate) fn bool_at(value: &JsonValue, key: &str, default: bool) -> bool {
    value.get(key).and_then(JsonValue::as_bool).unwrap_or(default)
}
