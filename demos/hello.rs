//! A small site showing the route, group, template and static file helpers.
//!
//! Run with `cargo run --example hello`, then try:
//!
//! - `curl -i localhost:3000/hello/ferris`
//! - `curl -i localhost:3000/api/users/1 -H 'Authorization: Bearer x'`
//! - `curl -i localhost:3000/static/index.html`

use axum::{http::StatusCode, response::Response};
use axum_httpserver::{
    BoxedMiddleware, Config, Next, Request, Result, Server, from_fn, respond_html, respond_json,
    respond_string,
};
use std::collections::HashMap;

const PAGE: &str = r#"<!doctype html>
<title>{{.Title}}</title>
<h1>Hello {{.Name | html}}</h1>"#;

async fn hello(req: Request) -> Result<Response> {
    let data = HashMap::from([
        ("Title".to_owned(), "hello".to_owned()),
        ("Name".to_owned(), req.query("name").unwrap_or("world").to_owned()),
    ]);
    respond_html(&req, "page", PAGE, data, &[])
}

async fn user(req: Request) -> Result<Response> {
    let id = req.query("id").unwrap_or_default();
    respond_json(
        &req,
        StatusCode::OK,
        &serde_json::json!({ "id": id, "name": "Ferris" }),
    )
}

fn require_auth() -> BoxedMiddleware {
    from_fn(|req: Request, next: Next| async move {
        match req.headers().get("authorization") {
            Some(_) => next.run(req).await,
            None => respond_string(&req, StatusCode::UNAUTHORIZED, "unauthorized"),
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::default()
        .with_bind_port(3000)
        .with_logger(true);

    let mut server = Server::new(config)?;
    server.head_get("/hello/{name}", hello, &[]);
    server
        .group("/api", &[require_auth()])
        .get("/users/{id}", user, &[]);
    server.files("/static/{*filepath}", "tests/static", &[])?;

    let mut errors = server.listen_error();
    let run = tokio::spawn(server.run());

    if let Some(errors) = errors.as_mut()
        && let Some(err) = errors.recv().await
    {
        eprintln!("server stopped: {err}");
    }
    run.await.ok();
    Ok(())
}
