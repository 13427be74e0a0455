//! HTTP client module
//!
//! The vendor transport: base URL joining, JSON defaults, per-request auth
//! headers and timeouts. Responses are buffered into [`HttpResponse`] so
//! adapters can inspect status, headers and body without holding a stream.

mod client;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, HttpResponse, RequestConfig,
    DEFAULT_TIMEOUT, HEALTH_CHECK_TIMEOUT,
};
