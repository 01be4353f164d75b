//! App start/stop benchmark suite.
//!
//! Measures full control round trips against an in-process control server:
//! - One start + stop cycle on a warm connection
//! - A batch of status queries on one started app
//!
//! Run with: cargo bench --bench start_stop
//! Results saved to: target/criterion/

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http_body_util::Full;
use httpmocker::{AppOptions, Client, HttpAdapter};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

// ============================================================================
// Control Server
// ============================================================================

/// Accepts every command; starts answer with a fixed app id.
async fn control(request: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let mut response = Response::builder().status(200);
    if request.method() == Method::POST && request.uri().path() == "/mock/app/" {
        response = response.header("m-app-id", "bench");
    }
    let body = if request.method() == Method::GET {
        r#"{"status":"running"}"#
    } else {
        "{}"
    };
    Ok(response
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("response"))
}

async fn spawn_control_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(control))
                    .await;
            });
        }
    });

    addr
}

// ============================================================================
// Benchmark Parameters
// ============================================================================

const STATUS_BATCHES: &[usize] = &[1, 10, 100];

// ============================================================================
// Benchmark: Start/Stop Cycle
// ============================================================================

fn bench_start_stop(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut client = rt.block_on(async {
        let addr = spawn_control_server().await;
        let mut client = Client::new(HttpAdapter::new("127.0.0.1", addr.port()));
        client.connect().await.expect("connect");
        client
    });

    let shared = &client;
    c.bench_function("start_stop_cycle", |b| {
        b.to_async(&rt).iter(move || async move {
            let mut app = shared.app("bench", 9001, AppOptions::new()).expect("app");
            app.start().await.expect("start");
            app.stop().await.expect("stop");
        });
    });

    rt.block_on(client.disconnect()).expect("disconnect");
}

// ============================================================================
// Benchmark: Status Queries
// ============================================================================

fn bench_status(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let (mut client, app) = rt.block_on(async {
        let addr = spawn_control_server().await;
        let mut client = Client::new(HttpAdapter::new("127.0.0.1", addr.port()));
        client.connect().await.expect("connect");
        let mut app = client.app("bench", 9001, AppOptions::new()).expect("app");
        app.start().await.expect("start");
        (client, app)
    });

    let app = &app;
    let mut group = c.benchmark_group("status");
    for &count in STATUS_BATCHES {
        group.bench_with_input(BenchmarkId::new("queries", count), &count, |b, &count| {
            b.to_async(&rt).iter(move || async move {
                for _ in 0..count {
                    app.running().await.expect("running");
                }
            });
        });
    }
    group.finish();

    rt.block_on(client.disconnect()).expect("disconnect");
}

criterion_group!(benches, bench_start_stop, bench_status);
criterion_main!(benches);
