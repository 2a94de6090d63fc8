//! Route groups

use super::{create_test_server, echo_handler, get_body_string, get_request, request};
use crate::{BoxedMiddleware, Next, Request, from_fn};
use axum::http::{HeaderValue, StatusCode};
use tower::ServiceExt;

fn tag(value: &'static str) -> BoxedMiddleware {
    from_fn(move |req: Request, next: Next| async move {
        let mut response = next.run(req).await;
        response
            .headers_mut()
            .append("x-trace", HeaderValue::from_static(value));
        response
    })
}

fn trace(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all("x-trace")
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_group_prefix_is_concatenated() {
    let mut server = create_test_server();
    {
        let mut api = server.group("/api/v1", &[]);
        api.get("/users", echo_handler, &[])
            .put("/users/{id}", echo_handler, &[]);
    }
    let app = server.into_router();

    let response = app.clone().oneshot(get_request("/api/v1/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("PUT", "/api/v1/users/7"))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "PUT id=7");

    let response = app.oneshot(get_request("/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_middleware_wraps_route_middleware() {
    let mut server = create_test_server();
    server
        .group("/g", &[tag("group-a"), tag("group-b")])
        .get("/x", echo_handler, &[tag("route")]);
    let app = server.into_router();

    let response = app.oneshot(get_request("/g/x")).await.unwrap();
    assert_eq!(trace(&response), vec!["route", "group-b", "group-a"]);
}

#[tokio::test]
async fn test_group_skips_global_middleware_unless_passed() {
    let mut server = create_test_server();
    server.middlewares.push(tag("global"));

    server.group("/plain", &[]).get("/x", echo_handler, &[]);
    let global = server.global_middleware();
    server.group("/opted", &global).get("/x", echo_handler, &[]);
    server.get("/top", echo_handler, &[]);
    let app = server.into_router();

    let response = app.clone().oneshot(get_request("/plain/x")).await.unwrap();
    assert!(trace(&response).is_empty());

    let response = app.clone().oneshot(get_request("/opted/x")).await.unwrap();
    assert_eq!(trace(&response), vec!["global"]);

    let response = app.oneshot(get_request("/top")).await.unwrap();
    assert_eq!(trace(&response), vec!["global"]);
}

#[tokio::test]
async fn test_nested_group_extends_prefix_and_middleware() {
    let mut server = create_test_server();
    {
        let mut api = server.group("/api", &[tag("outer")]);
        api.group("/admin", &[tag("inner")])
            .delete("/users/{id}", echo_handler, &[]);
    }
    let app = server.into_router();

    let response = app
        .oneshot(request("DELETE", "/api/admin/users/3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(trace(&response), vec!["inner", "outer"]);
}

#[tokio::test]
async fn test_group_routes_get_ids_and_panic_guard() {
    let mut server = create_test_server();
    server.group("/g", &[]).get(
        "/boom",
        |_req: Request| async move {
            panic!("group panic");
            #[allow(unreachable_code)]
            ""
        },
        &[],
    );
    let app = server.into_router();

    let response = app.oneshot(get_request("/g/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("request-id").is_some());
}
