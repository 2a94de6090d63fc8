//! Correlation ids on routed requests

use super::{create_test_server, get_request};
use crate::{Request, respond_string};
use axum::{
    Router,
    body::Body,
    http::{self, StatusCode},
};
use std::collections::HashSet;
use tower::ServiceExt;

fn id_router() -> Router {
    let mut server = create_test_server();
    server.get(
        "/id",
        |req: Request| async move {
            let seen = format!(
                "{}|{}",
                req.request_id().unwrap_or_default(),
                req.headers()
                    .get("request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
            );
            respond_string(&req, StatusCode::OK, seen)
        },
        &[],
    );
    server.into_router()
}

fn request_with_header(name: &str, value: &str) -> http::Request<Body> {
    http::Request::builder()
        .uri("/id")
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_request_id_is_generated_and_unique() {
    let app = id_router();
    let mut ids = HashSet::new();

    for _ in 0..20 {
        let response = app.clone().oneshot(get_request("/id")).await.unwrap();
        let id = response
            .headers()
            .get("request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(response.headers().get("x-request-id").is_none());
        ids.insert(id);
    }

    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_handler_sees_injected_header() {
    let app = id_router();
    let response = app.oneshot(get_request("/id")).await.unwrap();
    let header_id = response
        .headers()
        .get("request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();

    let body = super::get_body_string(response).await;
    assert_eq!(body, format!("{header_id}|{header_id}"));
}

#[tokio::test]
async fn test_x_request_id_becomes_request_id() {
    let app = id_router();
    let response = app
        .oneshot(request_with_header("X-Request-Id", "abc"))
        .await
        .unwrap();

    assert_eq!(response.headers().get("request-id").unwrap(), "abc");
    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc");
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let app = id_router();
    let response = app
        .oneshot(request_with_header("Request-Id", "from-client"))
        .await
        .unwrap();

    assert_eq!(response.headers().get("request-id").unwrap(), "from-client");
    assert_eq!(super::get_body_string(response).await, "from-client|from-client");
}
