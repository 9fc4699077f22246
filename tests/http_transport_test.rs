//! HttpTransport against a local axum server

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use url::Url;

use webresource::ResourceKind;
use webresource::retriever::{Retriever, RetrieverError};
use webresource::transport::{HttpConfig, HttpTransport, Request, TransferStats, Transport};

async fn serve_page() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<!doctype html><html></html>",
    )
}

async fn serve_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"items": [1, 2, 3]}"#)
}

async fn serve_redirect() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/page")])
}

async fn serve_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/loop")])
}

async fn serve_missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing here")
}

#[derive(Deserialize)]
struct AwayParams {
    to: String,
}

async fn serve_away(Query(params): Query<AwayParams>) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, params.to)])
}

/// Method and `Authorization` header of every request that reached `/target`
type Seen = Arc<Mutex<Vec<(Method, Option<String>)>>>;

async fn record_target(
    State(seen): State<Seen>,
    method: Method,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    seen.lock().unwrap().push((method, authorization));

    ([(header::CONTENT_TYPE, "text/html")], "<html></html>")
}

async fn serve_see_other() -> impl IntoResponse {
    (StatusCode::SEE_OTHER, [(header::LOCATION, "/target")])
}

async fn serve_found_target() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/target")])
}

async fn serve(app: Router) -> Url {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{}/", bound_addr)).unwrap()
}

/// Start a mock server on a random port and return its base URL
async fn start_mock_server() -> Url {
    let app = Router::new()
        .route("/page", get(serve_page))
        .route("/data", get(serve_json))
        .route("/redirect", get(serve_redirect))
        .route("/loop", get(serve_loop))
        .route("/missing", get(serve_missing))
        .route("/away", get(serve_away));

    serve(app).await
}

/// Start a server that records what arrives at `/target`
async fn start_recording_server() -> (Url, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/target", any(record_target))
        .route("/see-other", any(serve_see_other))
        .route("/found", any(serve_found_target))
        .with_state(seen.clone());

    (serve(app).await, seen)
}

fn bearer_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
    headers
}

fn http_retriever() -> Retriever {
    let transport = HttpTransport::new(HttpConfig::default()).unwrap();
    Retriever::with_transport(Arc::new(transport))
}

#[tokio::test]
async fn test_retrieves_page() {
    let base = start_mock_server().await;
    let retriever = http_retriever();

    let resource = retriever
        .retrieve(&Request::get(base.join("page").unwrap()))
        .await
        .unwrap();

    assert_eq!(resource.kind(), ResourceKind::Page);
    assert_eq!(resource.uri(), &base.join("page").unwrap());
    assert_eq!(resource.content(), "<!doctype html><html></html>");
    assert_eq!(resource.as_page().unwrap().character_set(), Some("utf-8"));
}

#[tokio::test]
async fn test_retrieves_json_document() {
    let base = start_mock_server().await;
    let retriever = http_retriever();

    let resource = retriever
        .retrieve(&Request::get(base.join("data").unwrap()))
        .await
        .unwrap();

    let data = resource.as_json_document().unwrap().data().unwrap();
    assert_eq!(data["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_redirect_sets_effective_uri() {
    let base = start_mock_server().await;
    let retriever = http_retriever();

    let resource = retriever
        .retrieve(&Request::get(base.join("redirect").unwrap()))
        .await
        .unwrap();

    assert_eq!(resource.kind(), ResourceKind::Page);
    assert_eq!(resource.uri(), &base.join("page").unwrap());
}

#[tokio::test]
async fn test_stats_reported_per_hop() {
    let base = start_mock_server().await;
    let transport = HttpTransport::new(HttpConfig::default()).unwrap();
    let mut hops = Vec::new();
    let mut record = |stats: &TransferStats| hops.push(stats.effective_uri.clone());

    let response = transport
        .send(&Request::get(base.join("redirect").unwrap()), &mut record)
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        hops,
        vec![base.join("redirect").unwrap(), base.join("page").unwrap()]
    );
}

#[tokio::test]
async fn test_redirect_loop_is_too_many_redirects() {
    let base = start_mock_server().await;
    let retriever = http_retriever();

    let err = retriever
        .retrieve(&Request::get(base.join("loop").unwrap()))
        .await
        .unwrap_err();

    let transport_err = err.as_transport().unwrap();
    assert!(transport_err.is_too_many_redirects());
    assert_eq!(err.to_string(), "Will not follow more than 5 redirects");
}

#[tokio::test]
async fn test_missing_resource_is_http_error() {
    let base = start_mock_server().await;
    let retriever = http_retriever();

    let err = retriever
        .retrieve(&Request::get(base.join("missing").unwrap()))
        .await
        .unwrap_err();

    assert!(matches!(err, RetrieverError::Http { .. }));
    assert_eq!(err.code(), 404);
    assert_eq!(err.to_string(), "Not Found");
    assert_eq!(err.response().unwrap().body, "nothing here");
}

#[tokio::test]
async fn test_strict_mode_rejects_on_head() {
    let base = start_mock_server().await;
    let mut retriever = http_retriever();
    retriever.set_allowed_content_types(["text/html"]);
    retriever.set_allow_unknown_resource_types(false);

    let err = retriever
        .retrieve(&Request::get(base.join("data").unwrap()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid content type \"application/json\"");
    assert_eq!(err.request().method, http::Method::HEAD);

    let page = retriever
        .retrieve(&Request::get(base.join("page").unwrap()))
        .await
        .unwrap();
    assert_eq!(page.kind(), ResourceKind::Page);
}

#[tokio::test]
async fn test_connection_refused_is_curl_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let retriever = http_retriever();
    let err = retriever
        .retrieve(&Request::get(
            Url::parse(&format!("http://{}/", addr)).unwrap(),
        ))
        .await
        .unwrap_err();

    let transport_err = err.as_transport().unwrap();
    assert!(transport_err.is_curl_error());
    assert_eq!(transport_err.transport_error_code(), 7);
}

#[tokio::test]
async fn test_cross_origin_redirect_drops_authorization() {
    let base = start_mock_server().await;
    let (other_base, seen) = start_recording_server().await;
    let transport = HttpTransport::new(HttpConfig::default()).unwrap();

    let mut away = base.join("away").unwrap();
    away.query_pairs_mut()
        .append_pair("to", other_base.join("target").unwrap().as_str());
    let request = Request::get(away).with_headers(bearer_headers());

    let response = transport
        .send(&request, &mut |_: &TransferStats| {})
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(seen.lock().unwrap().clone(), vec![(Method::GET, None)]);
}

#[tokio::test]
async fn test_same_origin_redirect_keeps_authorization() {
    let (base, seen) = start_recording_server().await;
    let transport = HttpTransport::new(HttpConfig::default()).unwrap();
    let request = Request::get(base.join("found").unwrap()).with_headers(bearer_headers());

    transport
        .send(&request, &mut |_: &TransferStats| {})
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().clone(),
        vec![(Method::GET, Some("Bearer secret".to_string()))]
    );
}

#[tokio::test]
async fn test_see_other_keeps_head_and_rewrites_post() {
    let (base, seen) = start_recording_server().await;
    let transport = HttpTransport::new(HttpConfig::default()).unwrap();
    let see_other = Request::get(base.join("see-other").unwrap());

    let head = transport
        .send(&see_other.with_method(Method::HEAD), &mut |_: &TransferStats| {})
        .await
        .unwrap();
    assert!(head.body.is_empty());

    transport
        .send(&see_other.with_method(Method::POST), &mut |_: &TransferStats| {})
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().clone(),
        vec![(Method::HEAD, None), (Method::GET, None)]
    );
}
