//! HTTP transport abstraction
//!
//! The retriever never talks to the network directly; it drives a
//! [`Transport`], which sends a [`Request`], reports each transfer through a
//! [`TransferStats`] hook and either hands back a [`Response`] or fails with a
//! [`TransportFailure`].

pub mod curl;
pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use ::http::header::CONTENT_TYPE;
use ::http::{HeaderMap, Method, StatusCode};
use std::borrow::Cow;
use thiserror::Error;
use url::Url;

pub use self::http::{HttpConfig, HttpTransport, TransportBuildError};
pub use curl::CurlError;

/// Outgoing request. Cloned rather than mutated when a variant is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub uri: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(uri: Url) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Copy of this request with a different method
    pub fn with_method(&self, method: Method) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Fully buffered response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    /// Canonical reason phrase for `status` (e.g. `"Not Found"`)
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// First `Content-Type` value, or `""` when absent. Non-UTF-8 bytes are
    /// replaced so the resolver can still recover what it can.
    pub fn content_type(&self) -> Cow<'_, str> {
        self.headers
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .unwrap_or_default()
    }
}

/// Per-transfer statistics handed to the caller's hook
#[derive(Debug, Clone)]
pub struct TransferStats {
    /// URI the transfer was made against
    pub effective_uri: Url,
    pub has_response: bool,
}

/// Hook invoked once per transfer, redirect hops included
pub type OnStats<'a> = &'a mut (dyn FnMut(&TransferStats) + Send);

#[derive(Debug, Clone, Error)]
pub enum TransportFailure {
    /// Error status delivered on the failure path; the response is still usable
    #[error("HTTP {}: {}", .0.status.as_u16(), .0.reason)]
    BadResponse(Response),

    #[error("{message}")]
    Connect { message: String },

    #[error("{message}")]
    TooManyRedirects { message: String },

    #[error("{message}")]
    Other { message: String, code: i64 },
}

impl TransportFailure {
    /// Code the failure carries on its own, before any decoding
    pub fn code(&self) -> i64 {
        match self {
            TransportFailure::BadResponse(response) => i64::from(response.status.as_u16()),
            TransportFailure::Other { code, .. } => *code,
            TransportFailure::Connect { .. } | TransportFailure::TooManyRedirects { .. } => 0,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request, following redirects, and report each transfer to `on_stats`
    async fn send(
        &self,
        request: &Request,
        on_stats: OnStats<'_>,
    ) -> Result<Response, TransportFailure>;
}
