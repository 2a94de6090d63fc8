mod cors;
mod staticdir;
mod tls;

pub use cors::*;
pub use staticdir::*;
pub use tls::*;

use {
    crate::Result,
    serde::Deserialize,
    std::{net::SocketAddr, time::Duration},
};

/// HTTP listener settings.
///
/// ```toml
/// [http]
/// bind_addr = "0.0.0.0"
/// bind_port = 8080
/// enable_logger = true
/// idle_timeout = "90s"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Address of the interface to listen on.
    /// The default listens on every interface.
    #[serde(default = "HttpConfig::default_bind_addr")]
    pub bind_addr: String,

    /// Port to listen on.
    #[serde(default = "HttpConfig::default_bind_port")]
    pub bind_port: u16,

    /// When true, logging goes through a non-blocking writer and every request
    /// is recorded by the access log middleware.
    #[serde(default)]
    pub enable_logger: bool,

    /// How long an HTTP/1 connection may take to send the next request
    /// headers. HTTP/2 connections are not limited. No timeout when unset.
    #[serde(default, with = "humantime_serde")]
    pub idle_timeout: Option<Duration>,

    /// Certificate and key used to serve HTTPS instead of HTTP.
    #[serde(default)]
    pub tls: Option<HttpTlsConfig>,

    /// Cross-origin policy. No CORS headers are produced when unset.
    #[serde(default)]
    pub cors: Option<HttpCorsConfig>,

    /// Directories served under a wildcard route at startup.
    #[serde(default)]
    pub directories: Vec<StaticDirConfig>,
}

impl HttpConfig {
    /// Returns the `addr:port` string the listener binds to.
    pub fn full_bind_addr(&self) -> String {
        match self.bind_addr.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.bind_port).to_string(),
            Err(_) => format!("{}:{}", self.bind_addr, self.bind_port),
        }
    }

    fn default_bind_addr() -> String {
        "0.0.0.0".into()
    }

    fn default_bind_port() -> u16 {
        3000
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(crate::Error::invalid_input(
                "HTTP bind_addr is required. Set [http] bind_addr = \"0.0.0.0\" or \"127.0.0.1\" in config.",
            ));
        }

        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(crate::Error::invalid_input(
                "HTTP bind_addr must be a valid IP address. Examples: \"127.0.0.1\", \"0.0.0.0\", \"::1\"",
            ));
        }

        if let Some(tls) = &self.tls {
            tls.validate()?;
        }

        for dir in &self.directories {
            dir.validate()?;
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::default_bind_addr(),
            bind_port: Self::default_bind_port(),
            enable_logger: false,
            idle_timeout: None,
            tls: None,
            cors: None,
            directories: Vec::new(),
        }
    }
}
