use thiserror::Error;

use crate::media_type::{MediaType, MediaTypeParseError};
use crate::transport::{CurlError, Request, Response, TransportFailure};

/// Underlying cause of a [`TransportError`]
#[derive(Debug, Clone)]
pub enum TransportCause {
    /// Connection failure decoded from a libcurl-style message
    Curl(CurlError),
    Failure(TransportFailure),
}

/// No response was obtained for the request
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    request: Request,
    message: String,
    code: i64,
    cause: TransportCause,
}

impl TransportError {
    /// Connect failures carrying a libcurl message are decoded; anything else is wrapped as-is
    pub fn new(request: Request, failure: TransportFailure) -> Self {
        if let TransportFailure::Connect { message } = &failure {
            if let Some(curl) = CurlError::from_message(message) {
                return Self {
                    request,
                    message: curl.message.clone(),
                    code: curl.code,
                    cause: TransportCause::Curl(curl),
                };
            }
        }

        Self {
            request,
            message: failure.to_string(),
            code: failure.code(),
            cause: TransportCause::Failure(failure),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transport_error_code(&self) -> i64 {
        self.code
    }

    pub fn cause(&self) -> &TransportCause {
        &self.cause
    }

    pub fn is_curl_error(&self) -> bool {
        matches!(self.cause, TransportCause::Curl(_))
    }

    pub fn is_too_many_redirects(&self) -> bool {
        matches!(
            self.cause,
            TransportCause::Failure(TransportFailure::TooManyRedirects { .. })
        )
    }
}

/// Every way a retrieval can fail. Each variant keeps the originating request.
#[derive(Debug, Clone, Error)]
pub enum RetrieverError {
    /// Response status outside 2xx; displays the reason phrase
    #[error("{}", .response.reason)]
    Http {
        request: Request,
        response: Response,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid content type \"{}\"", .content_type.type_subtype())]
    InvalidContentType {
        content_type: MediaType,
        request: Request,
        response: Response,
    },

    #[error("{source}")]
    MediaType {
        request: Request,
        #[source]
        source: MediaTypeParseError,
    },
}

impl RetrieverError {
    pub fn request(&self) -> &Request {
        match self {
            RetrieverError::Http { request, .. }
            | RetrieverError::InvalidContentType { request, .. }
            | RetrieverError::MediaType { request, .. } => request,
            RetrieverError::Transport(err) => err.request(),
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            RetrieverError::Http { response, .. }
            | RetrieverError::InvalidContentType { response, .. } => Some(response),
            RetrieverError::Transport(_) | RetrieverError::MediaType { .. } => None,
        }
    }

    /// HTTP status, transport error code, or 0
    pub fn code(&self) -> i64 {
        match self {
            RetrieverError::Http { response, .. } => i64::from(response.status.as_u16()),
            RetrieverError::Transport(err) => err.transport_error_code(),
            RetrieverError::InvalidContentType { .. } | RetrieverError::MediaType { .. } => 0,
        }
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        match self {
            RetrieverError::InvalidContentType { content_type, .. } => Some(content_type),
            _ => None,
        }
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            RetrieverError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
