//! In-process stub control server for tests.
//!
//! Replies are scripted in order; once the script runs out every request is
//! answered with `200 {}`. Every request is recorded for inspection.

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONNECTION, HeaderMap};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::transport::{Adapter, Connection, Endpoint, HttpAdapter};

// ============================================================================
// Logging
// ============================================================================

/// Routes crate logs to the test harness; safe to call from every test.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("httpmocker=debug"))
        .with_test_writer()
        .try_init();
}

// ============================================================================
// StubReply
// ============================================================================

/// A scripted response.
#[derive(Debug, Clone)]
pub(crate) struct StubReply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    close: bool,
}

impl StubReply {
    /// 200 with the given body.
    pub(crate) fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
            close: false,
        }
    }

    /// Failure with `{"error": message}`.
    pub(crate) fn failure(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: json!({ "error": message }).to_string(),
            close: false,
        }
    }

    /// Adds a response header.
    pub(crate) fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Closes the connection after this response.
    pub(crate) fn closing(mut self) -> Self {
        self.close = true;
        self
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        );
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if self.close {
            builder = builder.header(CONNECTION, "close");
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .expect("stub response")
    }
}

// ============================================================================
// SeenRequest
// ============================================================================

/// A request the stub received.
#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl SeenRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

// ============================================================================
// StubServer
// ============================================================================

#[derive(Default)]
struct StubState {
    replies: VecDeque<StubReply>,
    seen: Vec<SeenRequest>,
    connections: usize,
}

/// HTTP/1.1 server answering control requests from a script.
pub(crate) struct StubServer {
    port: u16,
    state: Arc<Mutex<StubState>>,
    accept_task: JoinHandle<()>,
}

impl StubServer {
    /// Binds an ephemeral port on all interfaces and starts serving.
    pub(crate) async fn start() -> Self {
        let listener = TcpListener::bind("0.0.0.0:0").await.expect("bind stub");
        let port = listener.local_addr().expect("stub addr").port();
        let state = Arc::new(Mutex::new(StubState::default()));

        let accept_state = Arc::clone(&state);
        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accept_state.lock().connections += 1;
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let service = service_fn(move |req| serve(Arc::clone(&state), req));
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            port,
            state,
            accept_task,
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Plain adapter pointed at the stub.
    pub(crate) fn adapter(&self) -> HttpAdapter {
        HttpAdapter::new("127.0.0.1", self.port)
    }

    /// Queues the next reply.
    pub(crate) fn push(&self, reply: StubReply) {
        self.state.lock().replies.push_back(reply);
    }

    /// Requests received so far.
    pub(crate) fn requests(&self) -> Vec<SeenRequest> {
        self.state.lock().seen.clone()
    }

    /// TCP connections accepted so far.
    pub(crate) fn connections(&self) -> usize {
        self.state.lock().connections
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve(
    state: Arc<Mutex<StubState>>,
    request: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = request.into_parts();
    let body = body.collect().await?.to_bytes();

    let reply = {
        let mut state = state.lock();
        state.seen.push(SeenRequest {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            body,
        });
        state.replies.pop_front()
    };

    Ok(reply.unwrap_or_else(|| StubReply::ok("{}")).into_response())
}

// ============================================================================
// CountingAdapter
// ============================================================================

/// Plain adapter that counts connect and disconnect calls.
#[derive(Debug)]
pub(crate) struct CountingAdapter {
    inner: HttpAdapter,
    pub connects: Arc<AtomicUsize>,
    pub disconnects: Arc<AtomicUsize>,
}

impl CountingAdapter {
    pub(crate) fn new(inner: HttpAdapter) -> Self {
        Self {
            inner,
            connects: Arc::new(AtomicUsize::new(0)),
            disconnects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Adapter for CountingAdapter {
    fn endpoint(&self) -> &Endpoint {
        self.inner.endpoint()
    }

    async fn connect(&mut self) -> Result<Connection> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.inner.connect().await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.inner.disconnect().await
    }

    fn conn(&self) -> Option<&Connection> {
        self.inner.conn()
    }
}
