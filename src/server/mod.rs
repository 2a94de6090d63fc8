//! The server: a route table plus the lifecycle around it.
//!
//! Every route is registered through the same decorator stack. From the
//! outside in, a request meets:
//!
//! 1. correlation id injection (`Request-Id` / `X-Request-Id`),
//! 2. the panic guard,
//! 3. the middleware chain, first element outermost,
//! 4. the handler.
//!
//! Server-level routes run the server's global middleware (the access log
//! when `http.enable_logger` is set) before their own. Group routes run the
//! group's middleware instead; see [`Group`].
//!
//! ```rust,no_run
//! use axum_httpserver::{Config, Request, Server, respond_string};
//! use axum::http::StatusCode;
//!
//! # async fn example() -> axum_httpserver::Result<()> {
//! let mut server = Server::new(Config::default().with_bind_port(8080))?;
//!
//! server.get("/hello/{name}", |req: Request| async move {
//!     let name = req.query("name").unwrap_or_default().to_owned();
//!     respond_string(&req, StatusCode::OK, format!("hello {name}"))
//! }, &[]);
//!
//! server.serve().await
//! # }
//! ```

/// Generates the per-verb registration methods on a type providing
/// `add_route(MethodFilter, &str, BoxedHandler, &[BoxedMiddleware]) -> &mut Self`.
macro_rules! route_methods {
    () => {
        /// Registers `handler` for `GET path`.
        pub fn get<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::GET,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `HEAD path`.
        pub fn head<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::HEAD,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers the same decorated handler for both `GET path` and `HEAD path`.
        pub fn head_get<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::GET.or(::axum::routing::MethodFilter::HEAD),
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `POST path`.
        pub fn post<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::POST,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `PUT path`.
        pub fn put<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::PUT,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `DELETE path`.
        pub fn delete<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::DELETE,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `PATCH path`.
        pub fn patch<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::PATCH,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }

        /// Registers `handler` for `OPTIONS path`.
        ///
        /// With CORS enabled, preflight requests are answered by the CORS
        /// layer and never reach this handler.
        pub fn options<H: $crate::Handler>(
            &mut self,
            path: &str,
            handler: H,
            middlewares: &[$crate::BoxedMiddleware],
        ) -> &mut Self {
            self.add_route(
                ::axum::routing::MethodFilter::OPTIONS,
                path,
                $crate::handler::boxed(handler),
                middlewares,
            )
        }
    };
}

mod cors;
mod files;
mod group;
mod lifecycle;

#[cfg(test)]
mod tests;

pub use files::{FILEPATH_WILDCARD, StaticFiles};
pub use group::Group;

use {
    crate::{
        BoxedHandler, BoxedMiddleware, Config, Error, Request, Result,
        middleware::{AccessLog, Middleware, Recover, chain, inject_request_id},
    },
    axum::{
        Router,
        extract::{RawPathParams, rejection::RawPathParamsRejection},
        routing::{MethodFilter, on},
    },
    rustls::ServerConfig,
    std::{path::Path, sync::Arc},
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing_appender::non_blocking::WorkerGuard,
};

pub struct Server {
    config: Config,
    router: Router,
    middlewares: Vec<BoxedMiddleware>,
    recover: Recover,
    tls: Option<Arc<ServerConfig>>,
    errors_tx: mpsc::Sender<Error>,
    errors_rx: Option<mpsc::Receiver<Error>>,
    shutdown: CancellationToken,
    log_guard: Option<WorkerGuard>,
}

impl Server {
    /// Builds a server from `config`.
    ///
    /// With `http.enable_logger` the global tracing subscriber is installed
    /// with a non-blocking writer and every server-level route gets the
    /// access log. TLS files and static directories from the configuration
    /// are loaded and registered here, so a bad key pair or route pattern
    /// fails now rather than at serve time.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let (errors_tx, errors_rx) = mpsc::channel(1);
        let mut server = Self {
            router: Router::new(),
            middlewares: Vec::new(),
            recover: Recover::new(),
            tls: None,
            errors_tx,
            errors_rx: Some(errors_rx),
            shutdown: CancellationToken::new(),
            log_guard: None,
            config,
        };

        if server.config.http.enable_logger {
            server.log_guard = Some(server.config.setup_buffered_tracing());
            server.middlewares.push(Arc::new(AccessLog));
        }

        if let Some(tls) = server.config.http.tls.clone() {
            server.tls_config(&tls.cert_file, &tls.key_file)?;
        }

        for dir in server.config.http.directories.clone() {
            server.files(&dir.route, &dir.directory, &[])?;
        }

        Ok(server)
    }

    route_methods!();

    /// Serves the files under `root` at `path`, which must end with
    /// [`FILEPATH_WILDCARD`]. The captured suffix is the file looked up.
    pub fn files(
        &mut self,
        path: &str,
        root: impl AsRef<Path>,
        middlewares: &[BoxedMiddleware],
    ) -> Result<&mut Self> {
        files::check_pattern(path)?;
        let handler: BoxedHandler = Arc::new(StaticFiles::new(root));
        Ok(self.add_route(MethodFilter::GET, path, handler, middlewares))
    }

    /// Opens a group of routes sharing `prefix` and `middlewares`.
    ///
    /// Group routes do not run the server's global middleware; pass
    /// [`global_middleware`](Server::global_middleware) in explicitly to
    /// get it.
    pub fn group(&mut self, prefix: &str, middlewares: &[BoxedMiddleware]) -> Group<'_> {
        Group::new(self, prefix, middlewares)
    }

    /// Middleware run by every server-level route.
    pub fn global_middleware(&self) -> Vec<BoxedMiddleware> {
        self.middlewares.clone()
    }

    /// Sends the message of every recovered panic to `tx`.
    ///
    /// Only routes registered after this call report to the channel.
    pub fn with_panic_channel(&mut self, tx: mpsc::Sender<String>) -> &mut Self {
        self.recover = Recover::new().with_channel(tx);
        self
    }

    /// Loads a PEM certificate chain and private key and serves HTTPS with
    /// them, replacing any TLS configuration set before.
    pub fn tls_config(
        &mut self,
        cert_file: impl AsRef<Path>,
        key_file: impl AsRef<Path>,
    ) -> Result<&mut Self> {
        self.tls = Some(lifecycle::load_tls(cert_file.as_ref(), key_file.as_ref())?);
        Ok(self)
    }

    /// Receives the error that ended [`run`](Server::run).
    ///
    /// The receiver can be taken once; later calls return `None`.
    pub fn listen_error(&mut self) -> Option<mpsc::Receiver<Error>> {
        self.errors_rx.take()
    }

    /// Cancelling this token stops accepting connections and lets the
    /// in-flight ones finish.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The assembled router, CORS included, for use with another server
    /// or in tests.
    pub fn into_router(self) -> Router {
        cors::apply(self.router, self.config.http.cors.as_ref())
    }

    fn add_route(
        &mut self,
        method: MethodFilter,
        path: &str,
        handler: BoxedHandler,
        middlewares: &[BoxedMiddleware],
    ) -> &mut Self {
        let stack: Vec<BoxedMiddleware> = self
            .middlewares
            .iter()
            .chain(middlewares)
            .cloned()
            .collect();
        let decorated = self.recover.wrap(chain(handler, &stack));
        register(&mut self.router, method, path, decorated);
        self
    }
}

/// Adds `handler` to `router`, behind correlation id injection and with
/// the path parameters merged into the query string.
///
/// # Panics
///
/// When the same method is registered twice on the same path, or the path
/// is not a valid route pattern.
pub(crate) fn register(router: &mut Router, method: MethodFilter, path: &str, handler: BoxedHandler) {
    let endpoint = move |params: std::result::Result<RawPathParams, RawPathParamsRejection>,
                         mut req: axum::extract::Request| {
        let handler = Arc::clone(&handler);
        async move {
            let ids = inject_request_id(req.headers_mut());
            req.extensions_mut().insert(ids);

            let params = params.ok();
            let req = Request::with_path_params(req, params.iter().flat_map(|p| p.iter()));
            handler.call(req).await
        }
    };

    tracing::debug!(?method, path, "route registered");
    *router = std::mem::take(router).route(path, on(method, endpoint));
}
