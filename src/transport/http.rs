//! Default transport backed by reqwest

use async_trait::async_trait;
use ::http::header::{AUTHORIZATION, COOKIE, LOCATION, PROXY_AUTHORIZATION};
use ::http::{HeaderMap, Method, StatusCode};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::curl::{COULDNT_CONNECT, CurlError, OPERATION_TIMEDOUT};
use super::{OnStats, Request, Response, TransferStats, Transport, TransportFailure};

#[derive(Debug, Error)]
#[error("Failed to build HTTP client: {0}")]
pub struct TransportBuildError(#[from] reqwest::Error);

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: concat!("webresource/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
        }
    }
}

/// reqwest-backed transport that follows redirects itself so every hop is
/// reported through [`TransferStats`]
pub struct HttpTransport {
    client: Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, TransportBuildError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Single transfer, no redirect handling
    async fn send_once(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderMap,
    ) -> Result<Response, TransportFailure> {
        debug!(%method, %uri, "Sending request");

        let response = self
            .client
            .request(method.clone(), uri.clone())
            .headers(headers.clone())
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_error)?;

        debug!(%uri, status = status.as_u16(), size = body.len(), "Response received");

        Ok(Response::new(status).with_headers(headers).with_body(body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &Request,
        on_stats: OnStats<'_>,
    ) -> Result<Response, TransportFailure> {
        let mut method = request.method.clone();
        let mut uri = request.uri.clone();
        let mut headers = request.headers.clone();
        let mut redirects = 0;

        loop {
            let response = match self.send_once(&method, &uri, &headers).await {
                Ok(response) => response,
                Err(failure) => {
                    on_stats(&TransferStats {
                        effective_uri: uri,
                        has_response: false,
                    });
                    return Err(failure);
                }
            };

            on_stats(&TransferStats {
                effective_uri: uri.clone(),
                has_response: true,
            });

            let Some(location) = redirect_location(&response, &uri) else {
                return Ok(response);
            };

            if redirects >= self.config.max_redirects {
                return Err(TransportFailure::TooManyRedirects {
                    message: format!(
                        "Will not follow more than {} redirects",
                        self.config.max_redirects
                    ),
                });
            }
            redirects += 1;

            method = redirect_method(&method, response.status);

            if location.origin() != uri.origin() {
                strip_credentials(&mut headers);
            }

            debug!(from = %uri, to = %location, status = response.status.as_u16(), "Following redirect");
            uri = location;
        }
    }
}

/// Target of a redirect response, resolved against the current URI
fn redirect_location(response: &Response, current: &Url) -> Option<Url> {
    if !matches!(
        response.status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    ) {
        return None;
    }

    let location = response.headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

/// 303 turns anything but GET/HEAD into GET; 301/302 only rewrite POST
fn redirect_method(method: &Method, status: StatusCode) -> Method {
    let rewrite = match status {
        StatusCode::SEE_OTHER => *method != Method::GET && *method != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => *method == Method::POST,
        _ => false,
    };

    if rewrite { Method::GET } else { method.clone() }
}

/// Credentials never follow a redirect to another origin
fn strip_credentials(headers: &mut HeaderMap) {
    for name in [AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION] {
        headers.remove(name);
    }
}

/// Report connection-level failures in libcurl numbering so they decode the
/// same way whichever transport produced them
fn map_error(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Connect {
            message: CurlError::new(OPERATION_TIMEDOUT, err.to_string()).to_message(),
        }
    } else if err.is_connect() {
        TransportFailure::Connect {
            message: CurlError::new(COULDNT_CONNECT, err.to_string()).to_message(),
        }
    } else if err.is_redirect() {
        TransportFailure::TooManyRedirects {
            message: err.to_string(),
        }
    } else {
        TransportFailure::Other {
            message: err.to_string(),
            code: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::http::HeaderValue;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_redirects, 5);
        assert!(config.user_agent.starts_with("webresource/"));
    }

    #[test]
    fn test_redirect_location_resolves_relative_target() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/next"));
        let response = Response::new(StatusCode::FOUND).with_headers(headers);
        let current = Url::parse("http://example.com/start").unwrap();

        assert_eq!(
            redirect_location(&response, &current).unwrap().as_str(),
            "http://example.com/next"
        );
    }

    #[test]
    fn test_redirect_without_location_is_final() {
        let response = Response::new(StatusCode::MOVED_PERMANENTLY);
        let current = Url::parse("http://example.com/").unwrap();
        assert!(redirect_location(&response, &current).is_none());
    }

    #[test]
    fn test_redirect_method() {
        let cases = [
            (Method::HEAD, StatusCode::SEE_OTHER, Method::HEAD),
            (Method::GET, StatusCode::SEE_OTHER, Method::GET),
            (Method::POST, StatusCode::SEE_OTHER, Method::GET),
            (Method::PUT, StatusCode::SEE_OTHER, Method::GET),
            (Method::POST, StatusCode::FOUND, Method::GET),
            (Method::POST, StatusCode::MOVED_PERMANENTLY, Method::GET),
            (Method::PUT, StatusCode::FOUND, Method::PUT),
            (Method::HEAD, StatusCode::MOVED_PERMANENTLY, Method::HEAD),
            (Method::POST, StatusCode::TEMPORARY_REDIRECT, Method::POST),
            (Method::POST, StatusCode::PERMANENT_REDIRECT, Method::POST),
        ];

        for (method, status, expected) in cases {
            assert_eq!(redirect_method(&method, status), expected, "{method} {status}");
        }
    }

    #[test]
    fn test_strip_credentials_keeps_other_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert(COOKIE, HeaderValue::from_static("session=1"));
        headers.insert(PROXY_AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert("x-trace", HeaderValue::from_static("42"));

        strip_credentials(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-trace").unwrap(), "42");
    }

    #[test]
    fn test_non_redirect_status_ignores_location() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("http://elsewhere.example/"));
        let response = Response::new(StatusCode::CREATED).with_headers(headers);
        let current = Url::parse("http://example.com/").unwrap();
        assert!(redirect_location(&response, &current).is_none());
    }
}
