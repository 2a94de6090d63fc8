//! Request handlers and their type-erased form.
//!
//! Routes of every shape end up in the same table, so handlers are stored as
//! [`BoxedHandler`]: an `Arc<dyn Handler>` that is cloned into each request.
//! Any `async fn(Request) -> impl IntoResponse` is a handler:
//!
//! ```rust
//! use axum_httpserver::{Request, respond_string};
//! use axum::{http::StatusCode, response::Response};
//!
//! async fn hello(req: Request) -> Response {
//!     let name = req.query("name").unwrap_or("world");
//!     respond_string(&req, StatusCode::OK, format!("hello {name}"))
//! }
//! ```
//!
//! Middleware receives and returns `BoxedHandler`s, see
//! [`Middleware`](crate::Middleware).

use {
    crate::request::Request,
    axum::response::{IntoResponse, Response},
    futures::future::BoxFuture,
    std::{future::Future, sync::Arc},
};

/// Something that turns a [`Request`] into a [`Response`].
///
/// Implemented for every `Fn(Request) -> impl Future<Output = impl IntoResponse>`
/// closure or function that can be shared across threads. Implement it
/// directly for handlers that carry their own state.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let fut = (self)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Erases the type of `handler`.
pub fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}
