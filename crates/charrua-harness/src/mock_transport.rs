//! Mock Transport for Testing
//!
//! Replies are scripted per method and path. One-shot replies are consumed in
//! order; a sticky reply answers every call once the queue is empty. Every
//! request is recorded so tests can assert on what the client sent.

use async_trait::async_trait;
use charrua_core::{ApiTransport, HttpMethod, HttpRequest, HttpResponse, TransportFailure};
use serde_json::{json, Value};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};
use tracing::debug;

// ----------------------------------------------------------------------------
// Mock Transport Configuration
// ----------------------------------------------------------------------------

/// Configuration for mock transport behavior
#[derive(Debug, Clone)]
pub struct MockTransportConfig {
    /// Simulated latency applied to every request
    pub latency: Duration,
    /// Status returned for requests with no scripted reply
    pub unmatched_status: u16,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            unmatched_status: 404,
        }
    }
}

impl MockTransportConfig {
    /// Backend that answers after a fixed delay
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }
}

// ----------------------------------------------------------------------------
// Scripted Replies
// ----------------------------------------------------------------------------

/// What the mock backend answers
#[derive(Debug, Clone)]
pub enum Reply {
    Response(HttpResponse),
    Failure(TransportFailure),
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Response(HttpResponse::json(status, &body))
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn no_content() -> Self {
        Reply::Response(HttpResponse::new(204, ""))
    }

    pub fn status(status: u16) -> Self {
        Reply::Response(HttpResponse::new(status, ""))
    }

    /// Error response carrying a backend message
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "message": message }))
    }

    pub fn connection_refused() -> Self {
        Reply::Failure(TransportFailure::Connect("connection refused".to_string()))
    }

    pub fn timeout(after: Duration) -> Self {
        Reply::Failure(TransportFailure::Timeout {
            after_ms: after.as_millis() as u64,
        })
    }
}

#[derive(Debug, Default)]
struct Route {
    queue: VecDeque<Reply>,
    sticky: Option<Reply>,
    delay: Option<Duration>,
}

type RouteKey = (HttpMethod, String);

// ----------------------------------------------------------------------------
// Mock Transport Implementation
// ----------------------------------------------------------------------------

/// Mock backend for deterministic testing
#[derive(Debug, Default)]
pub struct MockTransport {
    config: MockTransportConfig,
    routes: Mutex<HashMap<RouteKey, Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockTransportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn with_route<R>(&self, method: HttpMethod, path: &str, f: impl FnOnce(&mut Route) -> R) -> R {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        f(routes.entry((method, path.to_string())).or_default())
    }

    /// Queue a reply consumed by the next matching request
    pub fn enqueue(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.with_route(method, path, |route| route.queue.push_back(reply));
        self
    }

    /// Reply used for every matching request once the queue is empty
    pub fn always(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.with_route(method, path, |route| route.sticky = Some(reply));
        self
    }

    /// Extra latency for one route, on top of the configured latency
    pub fn delay(&self, method: HttpMethod, path: &str, delay: Duration) -> &Self {
        self.with_route(method, path, |route| route.delay = Some(delay));
        self
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn request_count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    /// Highest number of requests that were in flight at the same time
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn clear_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn next_reply(&self, request: &HttpRequest) -> (Reply, Duration) {
        let key = (request.method, request.path.clone());
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let route = routes.get_mut(&key);

        let delay = self.config.latency + route.as_ref().and_then(|r| r.delay).unwrap_or_default();
        let reply = route.and_then(|r| r.queue.pop_front().or_else(|| r.sticky.clone()));

        let reply = reply.unwrap_or_else(|| {
            Reply::error(
                self.config.unmatched_status,
                &format!("no mock for {} {}", request.method, request.path),
            )
        });
        (reply, delay)
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let (reply, delay) = self.next_reply(&request);
        debug!(method = %request.method, path = %request.path, "mock transport request");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Failure(failure) => Err(failure),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_queue_then_sticky() {
        let transport = MockTransport::new();
        transport
            .enqueue(HttpMethod::Get, "/a", Reply::status(500))
            .always(HttpMethod::Get, "/a", Reply::ok(json!({"ok": true})));

        let first = transport.execute(HttpRequest::get("/a")).await.unwrap();
        let second = transport.execute(HttpRequest::get("/a")).await.unwrap();
        let third = transport.execute(HttpRequest::get("/a")).await.unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(transport.request_count(HttpMethod::Get, "/a"), 3);
    }

    #[tokio::test]
    async fn test_unmatched_request() {
        let transport = MockTransport::new();
        let response = transport.execute(HttpRequest::post("/nada")).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(response.body.contains("POST /nada"));
    }

    #[tokio::test]
    async fn test_failures_are_returned() {
        let transport = MockTransport::new();
        transport.enqueue(HttpMethod::Get, "/x", Reply::connection_refused());
        let result = transport.execute(HttpRequest::get("/x")).await;
        assert!(matches!(result, Err(TransportFailure::Connect(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_tracking() {
        let transport = Arc::new(MockTransport::with_config(MockTransportConfig::slow(
            Duration::from_millis(100),
        )));
        transport.always(HttpMethod::Get, "/slow", Reply::no_content());

        let a = transport.execute(HttpRequest::get("/slow"));
        let b = transport.execute(HttpRequest::get("/slow"));
        let (a, b) = tokio::join!(a, b);

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(transport.max_concurrent(), 2);
    }
}
