//! Test helpers and utilities for Server tests
//!
//! These tests assemble the router with [`Server::into_router`] and drive it
//! with `oneshot()`, in process and without network I/O. Tests that need a
//! real listener live in `lifecycle.rs` and in the crate's `tests/` directory.

use crate::{Config, Request, Server, respond_string};
use axum::{body::Body, http, response::Response};

pub(crate) mod group;
pub(crate) mod request_id;

// ============================================================================
// Configuration Helpers
// ============================================================================

const BASE_CONFIG_TOML: &str = r#"
[http]
bind_addr = "127.0.0.1"
bind_port = 3000

[logging]
format = "json"
"#;

/// Creates a base test configuration by parsing TOML, so the result does
/// not depend on `RUST_ENV`.
pub(crate) fn create_base_config() -> Config {
    BASE_CONFIG_TOML
        .parse()
        .expect("Failed to parse test config TOML")
}

/// Creates a test configuration with additional TOML sections injected
/// after the `[http]` table.
pub(crate) fn create_config_with_toml(additional_toml: &str) -> Config {
    let toml_str = format!(
        r#"
[http]
bind_addr = "127.0.0.1"
bind_port = 3000

{additional_toml}

[logging]
format = "json"
        "#
    );

    toml_str.parse().expect("Failed to parse test config TOML")
}

pub(crate) fn create_test_server() -> Server {
    Server::new(create_base_config()).expect("Failed to create Server")
}

// ============================================================================
// Request Helpers
// ============================================================================

pub(crate) fn request(method: &str, uri: &str) -> http::Request<Body> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn get_request(uri: &str) -> http::Request<Body> {
    request("GET", uri)
}

/// Creates an OPTIONS preflight request for CORS testing.
pub(crate) fn options_request(uri: &str, origin: &str, method: &str) -> http::Request<Body> {
    http::Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("Origin", origin)
        .header("Access-Control-Request-Method", method)
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Response Helpers
// ============================================================================

pub(crate) async fn get_body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Answers with the method and the query string the handler saw.
pub(crate) async fn echo_handler(req: Request) -> Response {
    let body = format!("{} {}", req.method(), req.uri().query().unwrap_or_default());
    respond_string(&req, http::StatusCode::OK, body)
}
