use super::*;
use crate::decode::DateDecodingStrategy;
use crate::diagnostics::{DiagnosticReport, DiagnosticSink};
use crate::error::ApiError;
use crate::target::{Body, Encoding, Method, QueryItem, Target};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;

struct TestTarget {
    base: Option<String>,
    path: String,
    method: Method,
    headers: HashMap<String, String>,
    query: Vec<QueryItem>,
    body: Option<Body>,
    encoding: Encoding,
}

impl Default for TestTarget {
    fn default() -> Self {
        Self {
            base: Some("https://api.example.com".to_string()),
            path: "v1/items".to_string(),
            method: Method::Get,
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
            encoding: Encoding::Json,
        }
    }
}

impl Target for TestTarget {
    fn base_url(&self) -> Option<&str> {
        self.base.as_deref()
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> Method {
        self.method
    }

    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    fn query_items(&self) -> Vec<QueryItem> {
        self.query.clone()
    }

    fn body(&self) -> Option<Body> {
        self.body.clone()
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }
}

// ---- request builder ----

#[test]
fn test_empty_query_items_no_query_string() {
    let wire = build_request(&TestTarget::default(), None).unwrap();
    assert_eq!(wire.url.as_str(), "https://api.example.com/v1/items");
    assert!(wire.url.query().is_none());
}

#[test]
fn test_query_preserves_order_and_encodes() {
    let target = TestTarget {
        query: vec![
            QueryItem::new("b", "2"),
            QueryItem::new("a", "1 &x"),
            QueryItem::flag("pretty"),
        ],
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert_eq!(wire.url.query(), Some("b=2&a=1%20%26x&pretty"));
}

#[test]
fn test_path_join_no_duplicate_slashes() {
    let target = TestTarget {
        base: Some("https://api.example.com/api/".to_string()),
        path: "/v2/users".to_string(),
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert_eq!(wire.url.path(), "/api/v2/users");

    let target = TestTarget {
        base: Some("https://api.example.com/api".to_string()),
        path: "v2/users".to_string(),
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert_eq!(wire.url.path(), "/api/v2/users");
}

#[test]
fn test_json_encoding_sets_content_type_and_body() {
    let value = serde_json::json!({"name": "ada", "count": 3});
    let target = TestTarget {
        method: Method::Post,
        body: Some(Body::Json(value.clone())),
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert_eq!(
        wire.headers.get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(wire.body, Some(serde_json::to_vec(&value).unwrap()));
}

#[test]
fn test_url_encoding_no_content_type() {
    let target = TestTarget {
        encoding: Encoding::Url,
        body: Some(Body::raw(b"k=v".to_vec())),
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert!(wire.headers.get("content-type").is_none());
    assert_eq!(wire.body, Some(b"k=v".to_vec()));
}

#[test]
fn test_cache_always_bypassed() {
    let wire = build_request(&TestTarget::default(), None).unwrap();
    assert_eq!(wire.headers.get("cache-control").unwrap(), "no-cache");
}

#[test]
fn test_custom_headers_applied() {
    let mut headers = HashMap::new();
    headers.insert("x-api-key".to_string(), "secret".to_string());
    let target = TestTarget {
        headers,
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();
    assert_eq!(wire.headers.get("x-api-key").unwrap(), "secret");
}

#[test]
fn test_invalid_header_name_is_encoding_error() {
    let mut headers = HashMap::new();
    headers.insert("bad header".to_string(), "v".to_string());
    let target = TestTarget {
        headers,
        ..Default::default()
    };
    let err = build_request(&target, None).unwrap_err();
    assert!(matches!(err, ApiError::Encoding(_)));
}

#[test]
fn test_build_is_idempotent() {
    let target = TestTarget {
        method: Method::Put,
        query: vec![QueryItem::new("page", "2")],
        body: Some(Body::Json(serde_json::json!({"a": 1}))),
        ..Default::default()
    };
    let first = build_request(&target, None).unwrap();
    let second = build_request(&target, None).unwrap();
    assert_eq!(first.url, second.url);
    assert_eq!(first.headers, second.headers);
    assert_eq!(first.body, second.body);
    assert_eq!(first.method, second.method);
    assert_eq!(first.timeout, second.timeout);
}

#[test]
fn test_body_round_trips_through_builder() {
    #[derive(Debug, serde::Serialize, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        count: u32,
    }

    let payload = Payload {
        name: "ada".to_string(),
        count: 3,
    };
    let target = TestTarget {
        method: Method::Post,
        body: Some(Body::json(&payload).unwrap()),
        ..Default::default()
    };
    let wire = build_request(&target, None).unwrap();

    let decoded: Payload = crate::decode::decode(
        wire.body.as_deref().unwrap(),
        Default::default(),
        Default::default(),
    )
    .unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_missing_base_url_is_invalid_url() {
    let target = TestTarget {
        base: None,
        ..Default::default()
    };
    assert_eq!(build_request(&target, None).unwrap_err(), ApiError::InvalidUrl);
}

#[test]
fn test_unparsable_base_url_is_invalid_url() {
    let target = TestTarget {
        base: Some("not a url".to_string()),
        ..Default::default()
    };
    assert_eq!(build_request(&target, None).unwrap_err(), ApiError::InvalidUrl);
}

#[test]
fn test_fallback_base_url_used() {
    let fallback = Url::parse("https://fallback.example.com").unwrap();
    let target = TestTarget {
        base: None,
        ..Default::default()
    };
    let wire = build_request(&target, Some(&fallback)).unwrap();
    assert_eq!(wire.url.as_str(), "https://fallback.example.com/v1/items");
}

#[test]
fn test_default_timeout_carried() {
    let wire = build_request(&TestTarget::default(), None).unwrap();
    assert_eq!(wire.timeout, Duration::from_secs(120));
}

// ---- dispatch pipeline ----

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u64,
    name: String,
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serves one canned HTTP response on a throwaway local port.
async fn serve_once(response: String) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    addr
}

fn local_target(addr: SocketAddr) -> TestTarget {
    TestTarget {
        base: Some(format!("http://{addr}")),
        path: "v1/items/7".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_dispatch_success() {
    let addr = serve_once(http_response("200 OK", r#"{"id": 7, "name": "ada"}"#)).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let item: Item = client.dispatch(&local_target(addr)).await.unwrap();
    assert_eq!(
        item,
        Item {
            id: 7,
            name: "ada".to_string()
        }
    );
}

#[tokio::test]
async fn test_dispatch_accepts_201() {
    let addr = serve_once(http_response("201 Created", r#"{"id": 1, "name": "new"}"#)).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let item: Item = client.dispatch(&local_target(addr)).await.unwrap();
    assert_eq!(item.id, 1);
}

#[tokio::test]
async fn test_dispatch_rejected_status_carries_code() {
    let addr = serve_once(http_response("404 Not Found", "{}")).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let err = client.dispatch::<Item>(&local_target(addr)).await.unwrap_err();
    match err {
        ApiError::InvalidResponseStatus(code) => assert_eq!(code, "404"),
        other => panic!("expected InvalidResponseStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatch_malformed_body_is_decoding_error() {
    let addr = serve_once(http_response("200 OK", "definitely not json")).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let err = client.dispatch::<Item>(&local_target(addr)).await.unwrap_err();
    assert!(matches!(err, ApiError::Decoding(_)));
}

#[tokio::test]
async fn test_dispatch_empty_body_is_corrupt_data() {
    let addr = serve_once(http_response("200 OK", "")).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let err = client.dispatch::<Item>(&local_target(addr)).await.unwrap_err();
    assert_eq!(err, ApiError::CorruptData);
}

#[tokio::test]
async fn test_dispatch_transport_failure_is_data_task() {
    // Bind then drop to obtain a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = Client::new(ClientConfig::default()).unwrap();

    let err = client.dispatch::<Item>(&local_target(addr)).await.unwrap_err();
    assert!(matches!(err, ApiError::DataTask(_)));
}

#[tokio::test]
async fn test_dispatch_with_date_strategy() {
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Deserialize)]
    struct Event {
        created_at: DateTime<Utc>,
    }

    let addr = serve_once(http_response("200 OK", r#"{"created_at": 1700000000}"#)).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let options = DispatchOptions {
        date_strategy: DateDecodingStrategy::SecondsSinceEpoch,
        ..Default::default()
    };
    let event: Event = client
        .dispatch_with(&local_target(addr), options)
        .await
        .unwrap();
    assert_eq!(event.created_at, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
}

#[tokio::test]
async fn test_dispatch_callback_delivers_once() {
    let addr = serve_once(http_response("200 OK", r#"{"id": 7, "name": "ada"}"#)).await;
    let client = Client::new(ClientConfig::default()).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    client.dispatch_callback::<Item, _>(
        &local_target(addr),
        DispatchOptions::default(),
        move |result| {
            let _ = tx.send(result);
        },
    );

    let result = rx.await.unwrap();
    assert_eq!(result.unwrap().name, "ada");
}

#[tokio::test]
async fn test_dispatch_callback_reports_build_errors() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let target = TestTarget {
        base: None,
        ..Default::default()
    };

    let (tx, rx) = tokio::sync::oneshot::channel();
    client.dispatch_callback::<Item, _>(&target, DispatchOptions::default(), move |result| {
        let _ = tx.send(result);
    });

    assert_eq!(rx.await.unwrap().unwrap_err(), ApiError::InvalidUrl);
}

// ---- diagnostics ----

#[derive(Default)]
struct CaptureSink {
    reports: std::sync::Mutex<Vec<DiagnosticReport>>,
}

impl DiagnosticSink for CaptureSink {
    fn emit(&self, report: &DiagnosticReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

#[tokio::test]
async fn test_diagnostics_emitted_when_requested() {
    let addr = serve_once(http_response("200 OK", r#"{"id": 7, "name": "ada"}"#)).await;
    let sink = Arc::new(CaptureSink::default());
    let config = ClientConfig {
        diagnostics: sink.clone(),
        ..Default::default()
    };
    let client = Client::new(config).unwrap();

    let options = DispatchOptions {
        with_logs: true,
        ..Default::default()
    };
    let _item: Item = client
        .dispatch_with(&local_target(addr), options)
        .await
        .unwrap();

    let reports = sink.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.method, "GET");
    assert!(report.url.contains("/v1/items/7"));
    assert_eq!(report.status, Some(200));
    assert!(report.response_body.as_deref().unwrap().contains("ada"));
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_diagnostics_silent_by_default() {
    let addr = serve_once(http_response("200 OK", r#"{"id": 7, "name": "ada"}"#)).await;
    let sink = Arc::new(CaptureSink::default());
    let config = ClientConfig {
        diagnostics: sink.clone(),
        ..Default::default()
    };
    let client = Client::new(config).unwrap();

    let _item: Item = client.dispatch(&local_target(addr)).await.unwrap();
    assert!(sink.reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_verbose_client_reports_failures() {
    let addr = serve_once(http_response("500 Internal Server Error", "{}")).await;
    let sink = Arc::new(CaptureSink::default());
    let config = ClientConfig {
        diagnostics: sink.clone(),
        verbose: true,
        ..Default::default()
    };
    let client = Client::new(config).unwrap();

    let err = client.dispatch::<Item>(&local_target(addr)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponseStatus(_)));

    let reports = sink.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, Some(500));
    assert!(reports[0].error.as_deref().unwrap().contains("500"));
}
