//!
//! Configuration structures and utilities for wiring up the server.
//!
//! A configuration can be created in many ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced in the TOML
//! using the {{ VAR_NAME }} syntax, and they will be substituted with the corresponding
//! environment variable value. This keeps certificate paths and similar
//! deployment details out of the TOML files.
//!
//! Configuration is split into logical sections, each represented by their own struct:
//!
//! - `HttpConfig` for the listener, TLS, CORS and static directories
//! - `LoggingConfig` for logging and tracing settings
//!
mod http;
mod logging;

pub use http::*;
pub use logging::*;

use {
    crate::{Error, Result, utils::replace_handlebars_with_env},
    serde::Deserialize,
    std::{env, fs, path::PathBuf, str::FromStr, time::Duration},
    tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard},
    tracing_subscriber::fmt::MakeWriter,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    ///
    /// Creates a default configuration.
    /// This will attempt to load configuration from the file based on the RUST_ENV
    /// environment variable falling back to a default configuration if the environment
    /// variable is not set. Configuration files should be located in the "config/"
    /// directory of your project.
    ///
    fn default() -> Self {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(_) => Config {
                http: HttpConfig::default(),
                logging: LoggingConfig::default(),
            },
        }
    }
}

impl Config {
    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads the corresponding configuration file,
    /// substitutes any environment variables, and returns a Config struct.
    /// The configuration file is expected to be located at "config/{env}.toml"
    /// where {env} is the provided environment name (e.g., "dev", "prod").
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        toml_str.parse()
    }

    /// Sets the HTTP server bind address of the HttpConfig.
    pub fn with_bind_addr<S: AsRef<str>>(mut self, addr: S) -> Self {
        self.http.bind_addr = addr.as_ref().into();
        self
    }

    /// Sets the HTTP server bind port of the HttpConfig.
    pub fn with_bind_port(mut self, port: u16) -> Self {
        self.http.bind_port = port;
        self
    }

    /// Turns request logging through the background writer on or off.
    pub fn with_logger(mut self, enable: bool) -> Self {
        self.http.enable_logger = enable;
        self
    }

    /// Sets the keep-alive idle timeout of the HttpConfig.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.http.idle_timeout = Some(timeout);
        self
    }

    /// Serves HTTPS with the given PEM certificate chain and private key.
    pub fn with_tls_files(
        mut self,
        cert_file: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
    ) -> Self {
        self.http.tls = Some(HttpTlsConfig::new(cert_file, key_file));
        self
    }

    /// Sets the CORS configuration of the HttpConfig.
    /// Without one no CORS headers are produced.
    pub fn with_cors_config(mut self, cors_config: HttpCorsConfig) -> Self {
        self.http.cors = Some(cors_config);
        self
    }

    /// Adds a static directory served under `route`, which must end with `/{*filepath}`.
    pub fn with_directory(mut self, route: impl Into<String>, directory: impl Into<String>) -> Self {
        self.http
            .directories
            .push(StaticDirConfig::new(route, directory));
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Ensures that the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    /// Log lines are written synchronously to stdout.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted. It does nothing if a global
    ///       subscriber is already installed.
    ///
    pub fn setup_tracing(&self) {
        self.install_subscriber(std::io::stdout);
    }

    ///
    /// Sets up the tracing subscriber with a non-blocking writer: log lines are
    /// queued (up to `logging.buffered_lines_limit`) and written to stdout by a
    /// dedicated worker thread.
    ///
    /// The returned guard flushes the queue when dropped and must be kept alive
    /// for as long as logging is needed.
    ///
    pub fn setup_buffered_tracing(&self) -> WorkerGuard {
        let (writer, guard) = NonBlockingBuilder::default()
            .buffered_lines_limit(self.logging.buffered_lines_limit)
            .lossy(self.logging.lossy)
            .thread_name("httpserver-log")
            .finish(std::io::stdout());
        self.install_subscriber(writer);
        guard
    }

    fn install_subscriber<W>(&self, writer: W)
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        use tracing_subscriber::prelude::*;
        let env_filter = env_filter();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().with_writer(writer))
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact().with_writer(writer))
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

/// Level used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` if set, `info` otherwise.
fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
}

///
/// Parses a configuration string with references to environment variables
/// into a Config struct by substituting the environment variables and then
/// parsing the resulting TOML.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}
