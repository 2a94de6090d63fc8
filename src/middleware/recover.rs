//! Panic guard.
//!
//! [`Recover`] runs the rest of the chain inside `catch_unwind`. A panicking
//! handler produces a single `500` with the body `httpserver got panic`, and
//! the panic is logged with the method, path and request id followed by the
//! backtrace captured at the panic site. The server keeps serving.

use {
    super::Middleware,
    crate::{BoxedHandler, Request, response::write_response},
    futures::FutureExt,
    http::StatusCode,
    std::{
        any::Any,
        backtrace::Backtrace,
        cell::RefCell,
        panic::{self, AssertUnwindSafe},
        sync::{Arc, Once},
    },
    tokio::sync::mpsc,
};

pub const PANIC_BODY: &str = "httpserver got panic";

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Installs a process-wide panic hook recording the backtrace of the current
/// thread's last panic. The previous hook still runs.
///
/// Called by [`Recover::new`]; calling it again does nothing.
pub fn install_backtrace_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = LAST_BACKTRACE.try_with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    *slot = Some(Backtrace::force_capture());
                }
            });
            previous(info);
        }));
    });
}

fn take_backtrace() -> Option<Backtrace> {
    LAST_BACKTRACE
        .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut s| s.take()))
        .ok()
        .flatten()
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[derive(Debug, Clone)]
pub struct Recover {
    panic_tx: Option<mpsc::Sender<String>>,
}

impl Recover {
    pub fn new() -> Self {
        install_backtrace_hook();
        Self { panic_tx: None }
    }

    /// Also sends every panic message to `tx`. Messages are dropped when the
    /// channel is full.
    pub fn with_channel(mut self, tx: mpsc::Sender<String>) -> Self {
        self.panic_tx = Some(tx);
        self
    }
}

impl Default for Recover {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Recover {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let panic_tx = self.panic_tx.clone();
        Arc::new(move |req: Request| {
            let next = Arc::clone(&next);
            let panic_tx = panic_tx.clone();
            async move {
                let method = req.method().clone();
                let path = req.path().to_owned();
                let ids = req.ids().cloned();

                take_backtrace();
                let outcome = AssertUnwindSafe(async move { next.call(req).await })
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(response) => response,
                    Err(err) => {
                        let message = panic_message(&*err);
                        let request_id = ids.as_ref().map(|ids| ids.request_id()).unwrap_or("-");
                        let backtrace = take_backtrace()
                            .map(|bt| bt.to_string())
                            .unwrap_or_else(|| "<no backtrace captured>".to_owned());

                        tracing::error!(
                            method = %method,
                            path = %path,
                            request_id = %request_id,
                            panic = %message,
                            "handler panicked"
                        );
                        tracing::error!("PANIC START ({request_id})");
                        tracing::error!("{backtrace}");
                        tracing::error!("PANIC END ({request_id})");

                        if let Some(tx) = &panic_tx {
                            tx.try_send(message).ok();
                        }

                        write_response(
                            ids.as_ref(),
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Some(crate::response::CONTENT_TYPE_TEXT),
                            PANIC_BODY.into(),
                        )
                    }
                }
            }
        })
    }
}
