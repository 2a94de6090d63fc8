//! Accept loop, TLS and graceful shutdown.
//!
//! Connections are served by hyper's automatic HTTP/1 / HTTP/2 builder, one
//! task per connection, tracked in a `JoinSet`. Stopping (SIGINT, SIGTERM or
//! the server's cancellation token) closes the listener first, asks every
//! open connection to finish its current request, then waits for them.

use {
    super::{Server, cors},
    crate::{Error, Result},
    axum::Router,
    hyper_util::{
        rt::{TokioExecutor, TokioIo, TokioTimer},
        server::conn::auto::Builder as ConnBuilder,
        service::TowerToHyperService,
    },
    rustls::{
        ServerConfig,
        pki_types::{CertificateDer, PrivateKeyDer, pem::PemObject},
    },
    std::{net::SocketAddr, path::Path, sync::Arc, time::Duration},
    tokio::{
        io::{AsyncRead, AsyncWrite},
        net::{TcpListener, TcpStream},
        task::JoinSet,
    },
    tokio_rustls::TlsAcceptor,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

type Service = TowerToHyperService<Router>;

impl Server {
    /// Binds `http.bind_addr:http.bind_port` and serves until shutdown.
    ///
    /// Returns after every in-flight connection has finished, or with the
    /// error that stopped the listener.
    pub async fn serve(mut self) -> Result<()> {
        let log_guard = self.log_guard.take();
        let result = self.bind_and_serve().await;
        drop(log_guard);
        result
    }

    /// Serves on an already bound listener.
    pub async fn serve_with_listener(mut self, listener: TcpListener) -> Result<()> {
        let log_guard = self.log_guard.take();
        let result = self.serve_listener(listener).await;
        drop(log_guard);
        result
    }

    /// Serves until shutdown. A listener failure is logged and sent to the
    /// channel returned by [`listen_error`](Server::listen_error).
    pub async fn run(mut self) {
        // The log worker must outlive the failure line below.
        let log_guard = self.log_guard.take();
        let errors_tx = self.errors_tx.clone();
        if let Err(err) = self.bind_and_serve().await {
            error!(error = %err, "server failed with error");
            if errors_tx.try_send(err).is_err() {
                debug!("listen error dropped, nobody is listening");
            }
        }
        drop(log_guard);
    }

    async fn bind_and_serve(self) -> Result<()> {
        let addr = self.config.http.full_bind_addr();
        info!("server is starting...");
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|err| Error::io(format!("cannot listen on {addr}: {err}")))?;
        self.serve_listener(listener).await
    }

    async fn serve_listener(self, listener: TcpListener) -> Result<()> {
        let Server {
            config,
            router,
            tls,
            shutdown,
            ..
        } = self;

        let router = cors::apply(router, config.http.cors.as_ref());
        let service = TowerToHyperService::new(router);
        let acceptor = tls.map(TlsAcceptor::from);
        let idle_timeout = config.http.idle_timeout;

        let local_addr = listener.local_addr()?;
        info!(
            port = local_addr.port(),
            addr = %local_addr,
            tls = acceptor.is_some(),
            "running on port"
        );

        let mut tasks = JoinSet::new();
        let signal = shutdown_signal();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!(in_flight = tasks.len(), "shutdown requested, draining connections");
                    break;
                }

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    shutdown.cancel();
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(err) => {
                            error!(error = %err, "accept error");
                            continue;
                        }
                    };
                    tasks.spawn(serve_connection(
                        stream,
                        peer,
                        service.clone(),
                        acceptor.clone(),
                        idle_timeout,
                        shutdown.clone(),
                    ));
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);
        while tasks.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: Service,
    acceptor: Option<TlsAcceptor>,
    idle_timeout: Option<Duration>,
    shutdown: CancellationToken,
) {
    match acceptor {
        Some(acceptor) => match acceptor.accept(stream).await {
            Ok(stream) => drive(TokioIo::new(stream), peer, service, idle_timeout, shutdown).await,
            Err(err) => debug!(peer = %peer, error = %err, "tls handshake failed"),
        },
        None => drive(TokioIo::new(stream), peer, service, idle_timeout, shutdown).await,
    }
}

async fn drive<I>(
    io: TokioIo<I>,
    peer: SocketAddr,
    service: Service,
    idle_timeout: Option<Duration>,
    shutdown: CancellationToken,
) where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut builder = ConnBuilder::new(TokioExecutor::new());
    if let Some(timeout) = idle_timeout {
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(timeout);
    }

    let conn = builder.serve_connection_with_upgrades(io, service);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(err) = res {
                    debug!(peer = %peer, error = %err, "connection error");
                }
                break;
            }
            () = shutdown.cancelled(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

/// Reads a PEM certificate chain and private key into a server config
/// offering HTTP/2 and HTTP/1.1 over ALPN.
pub(super) fn load_tls(cert_file: &Path, key_file: &Path) -> Result<Arc<ServerConfig>> {
    let certs = CertificateDer::pem_file_iter(cert_file)
        .and_then(|certs| certs.collect::<std::result::Result<Vec<_>, _>>())
        .map_err(|err| {
            Error::tls(format!(
                "cannot read certificate {}: {err}",
                cert_file.display()
            ))
        })?;
    if certs.is_empty() {
        return Err(Error::tls(format!(
            "no certificate found in {}",
            cert_file.display()
        )));
    }

    let key = PrivateKeyDer::from_pem_file(key_file).map_err(|err| {
        Error::tls(format!(
            "cannot read private key {}: {err}",
            key_file.display()
        ))
    })?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Resolves on SIGINT or SIGTERM. A signal that cannot be listened for is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}
