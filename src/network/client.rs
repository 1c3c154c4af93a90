//! HTTP client wrapper - executes built requests and normalizes every outcome
//!
//! `execute_request` never fails: network errors, timeouts and cancellation
//! all come back as an [`ApiResponse`] with status 0 and an error kind.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use serde_json::{json, Value};

use crate::config::Settings;
use crate::errors::TransportErrorKind;
use crate::models::{ApiResponse, HttpMethod};
use crate::network::builder::BuiltRequest;
use crate::network::registry::RequestRegistry;

/// Lowercased error-chain fragments of a failed connection or a blocked call
const NETWORK_FAILURE_PATTERNS: &[&str] = &[
    "failed to fetch",
    "cors",
    "connection refused",
    "connection reset",
    "connection aborted",
    "connection closed",
    "dns error",
    "failed to lookup address",
    "network is unreachable",
    "no route to host",
    "broken pipe",
    "certificate",
    "tls handshake",
];

/// Why a send ended without a response
enum Failure {
    Timeout,
    Cancelled,
    Transport(reqwest::Error),
}

/// Response head and raw body as read off the wire
struct Received {
    status: reqwest::StatusCode,
    headers: BTreeMap<String, String>,
    time_ms: u64,
    body: Vec<u8>,
}

/// Execute a built request with a per-call timeout.
///
/// The id stays in `registry` until this returns, so it can be cancelled
/// from elsewhere; cancellation wins if it fires before completion.
pub async fn execute_request(
    client: &reqwest::Client,
    request: BuiltRequest,
    timeout: Duration,
    registry: &RequestRegistry,
) -> ApiResponse {
    let start = Instant::now();
    let (registration, mut cancel_rx) = registry.register(&request.id);
    tracing::info!(
        id = %request.id,
        method = request.method.as_str(),
        url = %request.url,
        "Executing request"
    );

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let outcome = tokio::select! {
        biased;

        Ok(()) = &mut cancel_rx => Err(Failure::Cancelled),
        _ = &mut deadline => Err(Failure::Timeout),
        result = fetch(client, &request, start) => result.map_err(Failure::Transport),
    };
    drop(registration);

    match outcome {
        Ok(received) => {
            let response = into_response(received);
            tracing::info!(
                id = %request.id,
                status = response.status,
                elapsed_ms = response.time_ms,
                size = response.size,
                "Request completed"
            );
            response
        }
        Err(Failure::Timeout) => {
            tracing::warn!(id = %request.id, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            failure_response(
                TransportErrorKind::Timeout,
                &format!("Request timed out after {}ms", timeout.as_millis()),
                format!("No response from {} within the time limit", request.url),
                start,
            )
        }
        Err(Failure::Cancelled) => {
            tracing::info!(id = %request.id, "Request cancelled");
            failure_response(
                TransportErrorKind::Timeout,
                "Request cancelled",
                format!("The request to {} was aborted before it settled", request.url),
                start,
            )
        }
        Err(Failure::Transport(e)) => {
            let kind = classify_error(&e);
            let details = error_chain(&e);
            tracing::warn!(id = %request.id, kind = kind.as_str(), "Request failed: {}", details);
            let summary = match kind {
                TransportErrorKind::CorsOrNetwork => {
                    "Network error: the request was blocked (CORS) or the server is unreachable"
                }
                TransportErrorKind::Timeout => "Request timed out",
                TransportErrorKind::UnknownClientError => "Request failed",
            };
            failure_response(kind, summary, details, start)
        }
    }
}

async fn fetch(
    client: &reqwest::Client,
    request: &BuiltRequest,
    start: Instant,
) -> Result<Received, reqwest::Error> {
    let mut req_builder = client.request(to_reqwest_method(request.method), request.url.clone());

    for (name, value) in request.headers.iter() {
        req_builder = req_builder.header(name, value);
    }

    if let Some(body) = &request.body {
        req_builder = req_builder.body(body.clone());
    }

    let resp = req_builder.send().await?;
    let time_ms = start.elapsed().as_millis() as u64;
    let status = resp.status();
    let headers = collect_headers(resp.headers());

    let mut stream = resp.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        body.extend_from_slice(&bytes);
        tracing::trace!(id = %request.id, bytes_received = body.len(), "Body chunk");
    }

    Ok(Received {
        status,
        headers,
        time_ms,
        body,
    })
}

fn into_response(received: Received) -> ApiResponse {
    let raw_body = String::from_utf8_lossy(&received.body).into_owned();
    let data = serde_json::from_str::<Value>(&raw_body)
        .unwrap_or_else(|_| Value::String(raw_body.clone()));

    ApiResponse {
        status: received.status.as_u16(),
        status_text: received
            .status
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
        headers: received.headers,
        data,
        time_ms: received.time_ms,
        size: raw_body.len(),
        raw_body,
        error: None,
    }
}

fn failure_response(
    kind: TransportErrorKind,
    summary: &str,
    details: String,
    start: Instant,
) -> ApiResponse {
    ApiResponse {
        status: 0,
        status_text: String::new(),
        headers: BTreeMap::new(),
        data: json!({
            "error": summary,
            "details": details,
            "kind": kind.as_str(),
        }),
        time_ms: start.elapsed().as_millis() as u64,
        size: 0,
        raw_body: String::new(),
        error: Some(kind),
    }
}

/// Repeated headers are joined the way browsers expose them
fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    map
}

fn classify_error(e: &reqwest::Error) -> TransportErrorKind {
    if e.is_timeout() {
        return TransportErrorKind::Timeout;
    }
    if e.is_connect() {
        return TransportErrorKind::CorsOrNetwork;
    }
    let chain = error_chain(e).to_lowercase();
    if NETWORK_FAILURE_PATTERNS.iter().any(|p| chain.contains(p)) {
        TransportErrorKind::CorsOrNetwork
    } else {
        TransportErrorKind::UnknownClientError
    }
}

fn error_chain(e: &reqwest::Error) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        parts.push(err.to_string());
        source = std::error::Error::source(err);
    }
    parts.join(": ")
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Create an HTTP client from settings. Timeouts are applied per call.
pub fn create_client(settings: &Settings) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthConfig, BodyType, Environment, KeyValuePair, RequestDefinition};
    use crate::network::builder::build_request;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, captures the raw request and answers with `response`
    async fn serve_once(response: String) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let captured = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            captured
        });
        (addr, handle)
    }

    /// Sends the response head and part of the body, then stalls
    async fn serve_partial_body() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\npartial";
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        addr
    }

    /// Accepts one connection and never answers
    async fn serve_hang() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        addr
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn http_response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nX-Multi: a\r\nX-Multi: b\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        )
    }

    fn get(url: String) -> BuiltRequest {
        build_request(&RequestDefinition::new(HttpMethod::GET, url), None).unwrap()
    }

    fn client() -> reqwest::Client {
        create_client(&Settings::default())
    }

    #[tokio::test]
    async fn test_json_response_is_parsed() {
        let (addr, server) =
            serve_once(http_response("200 OK", "application/json", r#"{"ok":true}"#)).await;
        let registry = RequestRegistry::new();

        let resp = execute_request(
            &client(),
            get(format!("http://{}/status", addr)),
            Duration::from_secs(5),
            &registry,
        )
        .await;
        server.await.unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.status_text, "OK");
        assert_eq!(resp.data, json!({"ok": true}));
        assert_eq!(resp.size, 11);
        assert_eq!(resp.headers.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(resp.headers.get("x-multi").map(String::as_str), Some("a, b"));
        assert!(resp.error.is_none());
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_non_json_body_kept_raw() {
        let (addr, server) =
            serve_once(http_response("404 Not Found", "text/plain", "nothing here")).await;
        let registry = RequestRegistry::new();

        let resp = execute_request(
            &client(),
            get(format!("http://{}/missing", addr)),
            Duration::from_secs(5),
            &registry,
        )
        .await;
        server.await.unwrap();

        assert_eq!(resp.status, 404);
        assert_eq!(resp.data, Value::String("nothing here".into()));
        assert_eq!(resp.raw_body, "nothing here");
        assert!(!resp.is_error());
    }

    #[tokio::test]
    async fn test_dispatched_request_carries_substitutions() {
        let (addr, server) = serve_once(http_response("201 Created", "text/plain", "")).await;
        let mut env = Environment::new("dev");
        env.set("base", format!("http://{}", addr));
        env.set("term", "hello");
        env.set("token", "tok");

        let mut def = RequestDefinition::new(HttpMethod::POST, "{{base}}/search");
        def.query_params.push(KeyValuePair::new("q", "{{term}}"));
        def.body_type = BodyType::Json;
        def.body = r#"{"term":"{{term}}"}"#.into();
        def.auth = Some(AuthConfig::Bearer {
            token: "{{token}}".into(),
        });
        let built = build_request(&def, Some(&env)).unwrap();

        let registry = RequestRegistry::new();
        let resp = execute_request(&client(), built, Duration::from_secs(5), &registry).await;
        let captured = server.await.unwrap();

        assert_eq!(resp.status, 201);
        assert!(captured.starts_with("POST /search?q=hello HTTP/1.1"));
        let lower = captured.to_lowercase();
        assert!(lower.contains("authorization: bearer tok"));
        assert!(lower.contains("content-type: application/json"));
        assert!(captured.ends_with(r#"{"term":"hello"}"#));
    }

    #[tokio::test]
    async fn test_timeout_normalizes_to_status_zero() {
        let addr = serve_hang().await;
        let registry = RequestRegistry::new();

        let resp = execute_request(
            &client(),
            get(format!("http://{}/slow", addr)),
            Duration::from_millis(100),
            &registry,
        )
        .await;

        assert_eq!(resp.status, 0);
        assert_eq!(resp.error, Some(TransportErrorKind::Timeout));
        assert_eq!(resp.size, 0);
        assert!(resp.headers.is_empty());
        assert!(resp.time_ms >= 100);
        assert_eq!(resp.data["kind"], "timeout");
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let addr = serve_hang().await;
        let registry = RequestRegistry::new();
        let mut def = RequestDefinition::new(HttpMethod::GET, format!("http://{}/hang", addr));
        def.id = "to-cancel".into();
        let built = build_request(&def, None).unwrap();

        let task = {
            let registry = registry.clone();
            tokio::spawn(async move {
                execute_request(&client(), built, Duration::from_secs(10), &registry).await
            })
        };

        while !registry.is_active("to-cancel") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(registry.cancel("to-cancel"));

        let resp = task.await.unwrap();
        assert_eq!(resp.status, 0);
        assert_eq!(resp.error, Some(TransportErrorKind::Timeout));
        assert_eq!(resp.data["error"], "Request cancelled");
        assert!(!registry.is_active("to-cancel"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let registry = RequestRegistry::new();
        let resp = execute_request(
            &client(),
            get(format!("http://{}/", addr)),
            Duration::from_secs(5),
            &registry,
        )
        .await;

        assert_eq!(resp.status, 0);
        assert_eq!(resp.error, Some(TransportErrorKind::CorsOrNetwork));
        assert!(resp.data["details"].as_str().is_some());
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_covers_body_stream() {
        let addr = serve_partial_body().await;
        let registry = RequestRegistry::new();

        let resp = execute_request(
            &client(),
            get(format!("http://{}/stream", addr)),
            Duration::from_millis(200),
            &registry,
        )
        .await;

        assert_eq!(resp.status, 0);
        assert_eq!(resp.error, Some(TransportErrorKind::Timeout));
        assert_eq!(resp.data["error"], "Request timed out after 200ms");
        assert!(resp.raw_body.is_empty());
        assert!(resp.time_ms >= 200);
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_unusable_header_is_unknown_client_error() {
        let mut def = RequestDefinition::new(HttpMethod::GET, "http://127.0.0.1:9/");
        def.headers.push(KeyValuePair::new("X-Control", "a\u{1}b"));
        let built = build_request(&def, None).unwrap();
        assert_eq!(built.headers.get("X-Control"), Some("a\u{1}b"));

        let registry = RequestRegistry::new();
        let resp = execute_request(&client(), built, Duration::from_secs(5), &registry).await;

        assert_eq!(resp.status, 0);
        assert_eq!(resp.error, Some(TransportErrorKind::UnknownClientError));
        assert_eq!(resp.data["kind"], "unknown-client-error");
        assert_eq!(resp.data["error"], "Request failed");
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_settles_every_send() {
        let registry = RequestRegistry::new();
        let mut tasks = Vec::new();
        for id in ["first", "second"] {
            let addr = serve_hang().await;
            let mut def = RequestDefinition::new(HttpMethod::GET, format!("http://{}/", addr));
            def.id = id.into();
            let built = build_request(&def, None).unwrap();
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                execute_request(&client(), built, Duration::from_secs(10), &registry).await
            }));
        }

        while registry.active_count() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(
            registry.cancel_all(),
            vec!["first".to_string(), "second".to_string()]
        );

        for task in tasks {
            let resp = task.await.unwrap();
            assert_eq!(resp.status, 0);
            assert_eq!(resp.error, Some(TransportErrorKind::Timeout));
            assert_eq!(resp.data["error"], "Request cancelled");
        }
        assert_eq!(registry.active_count(), 0);
    }
}
