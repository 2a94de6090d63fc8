//! # axum-httpserver
//!
//! A thin convenience layer over Axum for services that want Go-style
//! ergonomics: one call per verb to register a route, plain function
//! middleware, correlation ids on every request and response, panics turned
//! into `500`s, and helpers that write string, JSON and HTML responses.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::http::StatusCode;
//! use axum_httpserver::{Config, Request, Result, Server, respond_json, respond_string};
//!
//! async fn hello(req: Request) -> axum::response::Response {
//!     respond_string(&req, StatusCode::OK, "Hello, World!")
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut server = Server::new(Config::default())?;  // Loads from config/{RUST_ENV}.toml
//!
//!     server.get("/", hello, &[]);
//!     server.get("/users/{id}", |req: Request| async move {
//!         let id = req.query("id").unwrap_or_default();
//!         respond_json(&req, StatusCode::OK, &serde_json::json!({ "id": id }))
//!     }, &[]);
//!     server.files("/static/{*filepath}", "./public", &[])?;
//!
//!     server.serve().await
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [http]
//! bind_port = 3000
//! enable_logger = true
//! idle_timeout = "90s"
//! ```
//!
//! Run with `RUST_ENV=dev cargo run`.
//!
//! # What every route gets
//!
//! | Step | Behavior |
//! |------|----------|
//! | Correlation ids | `Request-Id` taken from the request, else from `X-Request-Id`, else a new UUIDv7 |
//! | Path parameters | Merged into the query string: `/users/{id}` reads as `req.query("id")` |
//! | Panic guard | A panicking handler answers `500 httpserver got panic`, the server keeps running |
//! | Middleware | Server (or group) middleware, then the route's own, first one outermost |
//! | Access log | One `info` line per request when `http.enable_logger` is set |
//!
//! # Cargo Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cors` | CORS policy from `[http.cors]` (default) |
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration loading and validation ([`Config`]) |
//! | [`server`] | Route table, groups, static files and the serve loop ([`Server`]) |
//! | [`middleware`] | Middleware trait, chaining, correlation ids, panic guard |
//! | [`response`] | Response helpers |
//! | [`template`] | Go template rendering ([`Html`]) |
//! | [`error`] | Error types and handling ([`Error`]) |
//!
//! # Configuration
//!
//! ```rust
//! use axum_httpserver::Config;
//! use std::time::Duration;
//!
//! // From string (useful for tests)
//! let config: Config = r#"
//!     [http]
//!     bind_port = 3000
//!
//!     [[http.directories]]
//!     route = "/assets/{*filepath}"
//!     directory = "./public"
//! "#.parse().unwrap();
//!
//! // With builder methods
//! let config = Config::default()
//!     .with_bind_port(8080)
//!     .with_logger(true)
//!     .with_idle_timeout(Duration::from_secs(30));
//! ```
//!
//! # Error Handling
//!
//! Setup calls return [`Result`]. Response and render helpers return
//! serialization and template errors to the handler, which can answer with
//! its own response or use `?`: [`Error`] converts to a JSON body.
//!
//! ```json
//! {
//!   "error_code": "TEMPLATE_ERROR",
//!   "message": "cannot parse template \"page\": unexpected EOF"
//! }
//! ```
pub mod config;
pub mod error;
mod handler;
pub mod middleware;
mod request;
pub mod response;
pub mod server;
pub mod template;
mod utils;

pub use config::*;
pub use error::*;
pub use handler::{BoxedHandler, Handler};
pub use middleware::{BoxedMiddleware, Middleware, Next, RequestIds, chain, from_fn};
pub use request::{DEFAULT_BODY_LIMIT, Request};
pub use response::{respond, respond_html, respond_json, respond_multi_html, respond_string};
pub use server::{FILEPATH_WILDCARD, Group, Server, StaticFiles};
pub use template::{Html, load_template, render_html, render_multi_html};
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
