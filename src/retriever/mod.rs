//! Retrieval pipeline
//!
//! [`Retriever::retrieve`] sends a request through a [`Transport`] and turns
//! the response into a typed [`WebResource`]:
//!
//! 1. when unknown resource types are disallowed, a HEAD request pre-verifies
//!    the content type before the full body is fetched;
//! 2. the real request is sent, tracking the effective URI across redirects;
//! 3. any status outside 2xx fails with [`RetrieverError::Http`];
//! 4. the `Content-Type` is resolved, classified and checked against the
//!    allow-list;
//! 5. the model for the classified [`ResourceKind`] is built.

mod error;

pub use error::{RetrieverError, TransportCause, TransportError};

use http::Method;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::media_type::{self, MediaType};
use crate::observability::RetrievalMetrics;
use crate::resource::{Resource, ResourceKind, WebResource, classify};
use crate::transport::{
    HttpConfig, HttpTransport, Request, Response, TransferStats, Transport, TransportBuildError,
    TransportFailure,
};

pub const DEFAULT_ALLOW_UNKNOWN_RESOURCE_TYPES: bool = true;

/// Fetches resources and builds typed models from them.
///
/// Configuration is read on every call; setters take `&mut self`, so it
/// cannot change while a retrieval borrowing the retriever is in flight.
pub struct Retriever {
    transport: Arc<dyn Transport>,
    allowed_content_types: Vec<String>,
    allow_unknown_resource_types: bool,
    metrics: RetrievalMetrics,
}

impl Retriever {
    /// Retriever with a default [`HttpTransport`], no allow-list and unknown types allowed
    pub fn new() -> Result<Self, TransportBuildError> {
        let transport = HttpTransport::new(HttpConfig::default())?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            allowed_content_types: Vec::new(),
            allow_unknown_resource_types: DEFAULT_ALLOW_UNKNOWN_RESOURCE_TYPES,
            metrics: RetrievalMetrics::new(),
        }
    }

    /// Retriever over an [`HttpTransport`] built from `config.http`, with `config.content` applied
    pub fn from_config(config: &Config) -> Result<Self, TransportBuildError> {
        let transport = HttpTransport::new(config.http.to_http_config())?;
        let mut retriever = Self::with_transport(Arc::new(transport));
        retriever.set_allowed_content_types(&config.content.allowed_content_types);
        retriever.set_allow_unknown_resource_types(config.content.allow_unknown_resource_types);
        Ok(retriever)
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = transport;
    }

    /// Replace the allow-list; entries are `type/subtype` strings, matched case-insensitively
    pub fn set_allowed_content_types<I, S>(&mut self, content_types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_content_types = content_types
            .into_iter()
            .map(|content_type| content_type.as_ref().trim().to_ascii_lowercase())
            .collect();
    }

    pub fn set_allow_unknown_resource_types(&mut self, allow: bool) {
        self.allow_unknown_resource_types = allow;
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    pub fn allow_unknown_resource_types(&self) -> bool {
        self.allow_unknown_resource_types
    }

    pub fn metrics(&self) -> &RetrievalMetrics {
        &self.metrics
    }

    pub async fn retrieve(&self, request: &Request) -> Result<WebResource, RetrieverError> {
        debug!(method = %request.method, uri = %request.uri, "Retrieving resource");

        if !self.allow_unknown_resource_types {
            self.pre_verify(&request.with_method(Method::HEAD)).await?;
        }

        let mut effective_uri = request.uri.clone();
        let mut track_effective_uri = |stats: &TransferStats| {
            if stats.has_response {
                effective_uri = stats.effective_uri.clone();
            }
        };

        let response = match self.transport.send(request, &mut track_effective_uri).await {
            Ok(response) => response,
            Err(TransportFailure::BadResponse(response)) => response,
            Err(failure) => {
                self.metrics.transport_error();
                let err = TransportError::new(request.clone(), failure);
                warn!(
                    uri = %request.uri,
                    code = err.transport_error_code(),
                    error = %err,
                    "Transport failure"
                );
                return Err(err.into());
            }
        };

        if !response.is_success() {
            self.metrics.http_error();
            debug!(uri = %request.uri, status = response.status.as_u16(), "Unsuccessful response status");
            return Err(RetrieverError::Http {
                request: request.clone(),
                response,
            });
        }

        let (kind, content_type) = self.verify_content_type(request, &response)?;

        self.metrics.retrieved();
        debug!(
            uri = %effective_uri,
            kind = %kind,
            content_type = %content_type.type_subtype(),
            "Resource retrieved"
        );

        Ok(WebResource::build(
            kind,
            Resource::new(effective_uri, response, content_type),
        ))
    }

    /// Best-effort HEAD check. Transport failures and 4xx/5xx responses are
    /// left for the real request to report; any other response is classified.
    async fn pre_verify(&self, request: &Request) -> Result<(), RetrieverError> {
        let mut ignore_stats = |_: &TransferStats| {};

        match self.transport.send(request, &mut ignore_stats).await {
            Ok(response) | Err(TransportFailure::BadResponse(response))
                if !is_error_status(&response) =>
            {
                self.verify_content_type(request, &response)?;
            }
            Ok(response) | Err(TransportFailure::BadResponse(response)) => {
                self.metrics.preverify_skipped();
                warn!(
                    uri = %request.uri,
                    status = response.status.as_u16(),
                    "Skipping content type pre-verification"
                );
            }
            Err(failure) => {
                self.metrics.preverify_skipped();
                warn!(uri = %request.uri, error = %failure, "Content type pre-verification failed");
            }
        }

        Ok(())
    }

    fn verify_content_type(
        &self,
        request: &Request,
        response: &Response,
    ) -> Result<(ResourceKind, MediaType), RetrieverError> {
        let content_type =
            media_type::resolve(&response.content_type()).map_err(|source| {
                RetrieverError::MediaType {
                    request: request.clone(),
                    source,
                }
            })?;

        let kind = classify(&content_type);
        let type_subtype = content_type.type_subtype();
        let is_allowed = self
            .allowed_content_types
            .iter()
            .any(|allowed| *allowed == type_subtype);

        if !is_allowed && !self.allow_unknown_resource_types {
            self.metrics.content_type_rejected();
            warn!(
                method = %request.method,
                uri = %request.uri,
                content_type = %type_subtype,
                "Content type not allowed"
            );
            return Err(RetrieverError::InvalidContentType {
                content_type,
                request: request.clone(),
                response: response.clone(),
            });
        }

        Ok((kind, content_type))
    }
}

fn is_error_status(response: &Response) -> bool {
    response.status.is_client_error() || response.status.is_server_error()
}
