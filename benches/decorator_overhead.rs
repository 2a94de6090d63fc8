//! Benchmarks for measuring the per-route decorator overhead.
//!
//! Every registered route pays for correlation id injection, the panic guard
//! and the middleware chain. These benchmarks compare that against a bare
//! axum route and track how the cost grows with the chain length.

use axum::{Router, body::Body, http::Request, routing::get};
use axum_httpserver::{BoxedMiddleware, Config, Next, Server, from_fn, respond_string};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::{collections::HashMap, hint::black_box};
use tower::ServiceExt;

/// Simple handler that returns immediately
async fn handler() -> &'static str {
    "OK"
}

fn test_config() -> Config {
    "[http]\nbind_addr = \"127.0.0.1\"\n"
        .parse()
        .unwrap()
}

/// Creates a minimal request for benchmarking
fn test_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn passthrough() -> BoxedMiddleware {
    from_fn(|req: axum_httpserver::Request, next: Next| next.run(req))
}

/// Benchmark: Bare axum router
fn bench_bare_axum(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let router = Router::new().route("/", get(handler));

    c.bench_function("bare_axum", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router.clone().oneshot(test_request("/")).await.unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: decorated route with no middleware
fn bench_decorated(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut server = Server::new(test_config()).unwrap();
    server.get(
        "/",
        |req: axum_httpserver::Request| async move {
            respond_string(&req, axum::http::StatusCode::OK, "OK")
        },
        &[],
    );
    let router = server.into_router();

    c.bench_function("decorated_route", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router.clone().oneshot(test_request("/")).await.unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: path parameters merged into the query
fn bench_path_params(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut server = Server::new(test_config()).unwrap();
    server.get(
        "/users/{id}/posts/{post}",
        |req: axum_httpserver::Request| async move {
            let id = req.query("id").unwrap_or_default().to_owned();
            respond_string(&req, axum::http::StatusCode::OK, id)
        },
        &[],
    );
    let router = server.into_router();

    c.bench_function("decorated_path_params", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(test_request("/users/42/posts/7?sort=asc"))
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: chain length
fn bench_chain_length(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("chain_length");

    for len in [1usize, 4, 16] {
        let middlewares: Vec<BoxedMiddleware> = (0..len).map(|_| passthrough()).collect();
        let mut server = Server::new(test_config()).unwrap();
        server.get(
            "/",
            |req: axum_httpserver::Request| async move {
                respond_string(&req, axum::http::StatusCode::OK, "OK")
            },
            &middlewares,
        );
        let router = server.into_router();

        group.bench_with_input(BenchmarkId::from_parameter(len), &router, |b, router| {
            b.to_async(&rt).iter(|| async {
                let response = router.clone().oneshot(test_request("/")).await.unwrap();
                black_box(response)
            })
        });
    }

    group.finish();
}

/// Benchmark: template rendering
fn bench_render_html(c: &mut Criterion) {
    let data = HashMap::from([("Name".to_owned(), "World".to_owned())]);

    c.bench_function("render_html", |b| {
        b.iter(|| {
            let html = axum_httpserver::render_html(
                "bench",
                "<p>Hello {{.Name}}</p>",
                data.clone(),
                &[],
            )
            .unwrap();
            black_box(html)
        })
    });
}

criterion_group!(
    benches,
    bench_bare_axum,
    bench_decorated,
    bench_path_params,
    bench_chain_length,
    bench_render_html
);
criterion_main!(benches);
