//! Middleware: handler-to-handler transformations.
//!
//! A [`Middleware`] receives the next handler in line and returns a new one
//! wrapping it. A list of middleware is folded around a handler with
//! [`chain`], the first element ending up outermost.
//!
//! ```rust
//! use axum_httpserver::{BoxedMiddleware, Next, Request, from_fn};
//!
//! let powered_by: BoxedMiddleware = from_fn(|req: Request, next: Next| async move {
//!     let mut response = next.run(req).await;
//!     response
//!         .headers_mut()
//!         .insert("x-powered-by", http::HeaderValue::from_static("axum-httpserver"));
//!     response
//! });
//! ```

mod access_log;
pub mod recover;
pub mod request_id;

pub use access_log::AccessLog;
pub use recover::Recover;
pub use request_id::{RequestIds, inject_request_id};

use {
    crate::{BoxedHandler, Request},
    axum::response::Response,
    std::{future::Future, sync::Arc},
};

pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Wraps `handler` in `middlewares`, `middlewares[0]` being the outermost.
pub fn chain(handler: BoxedHandler, middlewares: &[BoxedMiddleware]) -> BoxedHandler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware.wrap(next))
}

/// The rest of the chain, as seen by a [`from_fn`] middleware.
#[derive(Clone)]
pub struct Next(BoxedHandler);

impl Next {
    pub async fn run(self, req: Request) -> Response {
        self.0.call(req).await
    }
}

/// Builds a middleware from an async function taking the request and the
/// rest of the chain.
pub fn from_fn<F, Fut>(f: F) -> BoxedMiddleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(FromFn { f: Arc::new(f) })
}

struct FromFn<F> {
    f: Arc<F>,
}

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let f = Arc::clone(&self.f);
        Arc::new(move |req: Request| (*f)(req, Next(Arc::clone(&next))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::boxed;
    use axum::{body::Body, response::IntoResponse};
    use std::sync::Mutex;

    fn request() -> Request {
        Request::from_http(http::Request::builder().uri("/").body(Body::empty()).unwrap())
    }

    fn recording(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> BoxedMiddleware {
        from_fn(move |req: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{name} in"));
                let response = next.run(req).await;
                log.lock().unwrap().push(format!("{name} out"));
                response
            }
        })
    }

    #[tokio::test]
    async fn first_middleware_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler_log = Arc::clone(&log);
        let handler = boxed(move |_req: Request| {
            let log = Arc::clone(&handler_log);
            async move {
                log.lock().unwrap().push("handler".to_owned());
                "ok"
            }
        });

        let chained = chain(
            handler,
            &[
                recording("a", Arc::clone(&log)),
                recording("b", Arc::clone(&log)),
            ],
        );
        chained.call(request()).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a in", "b in", "handler", "b out", "a out"]
        );
    }

    #[tokio::test]
    async fn empty_chain_is_the_handler() {
        let chained = chain(boxed(|_req: Request| async { "plain" }), &[]);
        let response = chained.call(request()).await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"plain");
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let deny = from_fn(|_req: Request, _next: Next| async {
            http::StatusCode::FORBIDDEN.into_response()
        });
        let chained = chain(
            boxed(|_req: Request| async { panic!("must not run") }),
            &[deny],
        );
        let response = chained.call(request()).await;
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
    }
}
