//! HTTP transport abstraction.
//!
//! A [`Transport`] performs exactly one round trip. Everything above it
//! (auth headers, URL building, decoding) lives in [`Connection`](crate::Connection);
//! everything below it (sockets, TLS, retries) lives in the implementation.

mod reqwest_transport;
mod retry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;
use url::Url;

pub use reqwest_transport::ReqwestTransport;
pub use retry::RetryTransport;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A fully built request, ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Whether sending the request twice has the same effect as sending it once.
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self.method,
            Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
        )
    }
}

/// Raw reply: status, headers and the whole body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Failure to complete a round trip. HTTP error statuses are not transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {url} failed: {source}")]
    Other {
        url: String,
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// Connect failures and timeouts may succeed when tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }

    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Connect { url, .. }
            | Self::Timeout { url }
            | Self::Body { url, .. }
            | Self::Other { url, .. } => url,
        }
    }
}

/// One HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).round_trip(request).await
    }
}
