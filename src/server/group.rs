use {
    super::{Server, register},
    crate::{
        BoxedHandler, BoxedMiddleware, Result,
        middleware::{Middleware, chain},
    },
    axum::routing::MethodFilter,
    std::path::Path,
};

/// Routes sharing a path prefix and a middleware list.
///
/// The prefix is prepended as is, so `group("/api", ..)` then `get("/users", ..)`
/// registers `/api/users`. A group route runs the group's middleware, then the
/// route's own, but not the server's global middleware:
///
/// ```rust,no_run
/// # use axum_httpserver::{Config, Request, Server};
/// # fn example() -> axum_httpserver::Result<()> {
/// let mut server = Server::new(Config::default().with_logger(true))?;
/// let logged = server.global_middleware();
///
/// let mut api = server.group("/api", &logged);
/// api.get("/users", |_req: Request| async { "[]" }, &[]);
/// # Ok(())
/// # }
/// ```
pub struct Group<'s> {
    server: &'s mut Server,
    prefix: String,
    middlewares: Vec<BoxedMiddleware>,
}

impl<'s> Group<'s> {
    pub(super) fn new(server: &'s mut Server, prefix: &str, middlewares: &[BoxedMiddleware]) -> Self {
        Self {
            server,
            prefix: prefix.to_owned(),
            middlewares: middlewares.to_vec(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    route_methods!();

    /// Serves the files under `root` at `prefix + path`.
    ///
    /// Static routes are registered on the server itself: they run the
    /// server's global middleware, not the group's.
    pub fn files(
        &mut self,
        path: &str,
        root: impl AsRef<Path>,
        middlewares: &[BoxedMiddleware],
    ) -> Result<&mut Self> {
        let full_path = format!("{}{path}", self.prefix);
        self.server.files(&full_path, root, middlewares)?;
        Ok(self)
    }

    /// Opens a nested group. Its prefix and middleware extend this group's.
    pub fn group(&mut self, prefix: &str, middlewares: &[BoxedMiddleware]) -> Group<'_> {
        let mut stack = self.middlewares.clone();
        stack.extend_from_slice(middlewares);
        Group {
            server: &mut *self.server,
            prefix: format!("{}{prefix}", self.prefix),
            middlewares: stack,
        }
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
        let decorated = self.server.recover.wrap(chain(handler, &stack));
        register(
            &mut self.server.router,
            method,
            &format!("{}{path}", self.prefix),
            decorated,
        );
        self
    }
}
