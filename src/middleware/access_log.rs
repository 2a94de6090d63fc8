use {
    super::Middleware,
    crate::{BoxedHandler, Request},
    std::{sync::Arc, time::Instant},
};

/// Logs one line per request once the response is ready.
///
/// Added to the server's global middleware when `http.enable_logger` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(move |req: Request| {
            let next = Arc::clone(&next);
            async move {
                let method = req.method().clone();
                let path = req.path().to_owned();
                let request_id = req.request_id().unwrap_or("-").to_owned();
                let started = Instant::now();

                let response = next.call(req).await;

                tracing::info!(
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    elapsed = ?started.elapsed(),
                    request_id = %request_id,
                    "request served"
                );
                response
            }
        })
    }
}
