//! HTTP transport shared by all adapters
//!
//! A thin layer over reqwest that handles:
//! - joining request paths onto the profile's base URL
//! - default and per-request headers
//! - auth headers from the connection's [`TokenCache`]
//! - per-request timeout overrides
//!
//! Failed requests are reported once; there is no retry loop.

use crate::auth::TokenCache;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout for every vendor request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for connect probes and health checks
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all relative request paths
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests, in insertion order
    pub default_headers: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
    /// Keep cookies between requests (needed for SAP CSRF sessions)
    pub cookie_store: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            default_headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            user_agent: format!("enterprise-bridge/{}", env!("CARGO_PKG_VERSION")),
            cookie_store: true,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add or replace a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.config.default_headers, key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, sent in order
    pub query: Vec<(String, String)>,
    /// Request headers, applied after the defaults
    pub headers: Vec<(String, String)>,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters
    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully buffered response: status, headers and body text
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HttpResponse {
    /// Build a response by hand
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers,
            body: body.into(),
        }
    }

    /// Numeric status code
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Header value as a string, when present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::decode(format!("Invalid JSON in response body: {e}")))
    }

    /// Body as JSON, falling back to the raw text; an empty body is `null`
    pub fn json_or_text(&self) -> JsonValue {
        if self.body.trim().is_empty() {
            return JsonValue::Null;
        }
        serde_json::from_str(&self.body).unwrap_or_else(|_| JsonValue::String(self.body.clone()))
    }

    /// Turn any non-2xx response into `Error::HttpStatus`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status(), self.body))
        }
    }
}

/// Authenticated HTTP client
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    auth: Option<Arc<TokenCache>>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .cookie_store(config.cookie_store)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            config,
            auth: None,
        })
    }

    /// Create a client that attaches credentials from `auth` to every request
    pub fn with_auth(config: HttpClientConfig, auth: Arc<TokenCache>) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.auth = Some(auth);
        Ok(client)
    }

    /// Send one request and buffer the response. Non-2xx statuses are returned,
    /// not raised; transport failures and auth failures are errors.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        let full_url = self.build_url(path);
        let timeout = config.timeout.unwrap_or(self.config.timeout);
        let timed_out = || Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        };
        // Token acquisition and the call itself share one budget
        let started = Instant::now();

        // Later layers replace earlier ones: defaults, then auth, then per-request
        let mut headers = self.config.default_headers.clone();
        if let Some(ref auth) = self.auth {
            let pairs = tokio::time::timeout(timeout, auth.auth_headers())
                .await
                .map_err(|_| timed_out())??;
            for (key, value) in pairs {
                set_header(&mut headers, key, value);
            }
        }
        for (key, value) in config.headers {
            set_header(&mut headers, key, value);
        }

        let mut req = self.client.request(method.clone(), &full_url);
        for (key, value) in headers {
            req = req.header(key, value);
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        if let Some(ref body) = config.body {
            req = req.json(body);
        }

        req = req.timeout(timeout.saturating_sub(started.elapsed()));

        debug!("{} {}", method, full_url);

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                timed_out()
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(Error::Http)?;

        debug!("{} {} -> {}", method, full_url, status.as_u16());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Build full URL from path. Absolute URLs pass through untouched.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

/// Insert a header, replacing any existing one with the same (case-insensitive) name
fn set_header(headers: &mut Vec<(String, String)>, key: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
        Some(existing) => existing.1 = value,
        None => headers.push((key, value)),
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_auth", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}
