use http::{HeaderName, Method};
use serde::Deserialize;
use std::{str::FromStr, time::Duration};

/// Configuration for Cross-Origin Resource Sharing (CORS).
///
/// When the section is present the whole router is wrapped in a CORS layer
/// that answers preflight requests itself. Lists left unset fall back to
/// wildcards, unless `allow_credentials` is true, in which case only the
/// values listed explicitly are allowed.
///
/// ```toml
/// [http.cors]
/// allow_credentials = true
/// allowed_origins = ["https://app.example.com", "https://admin.example.com"]
/// allowed_methods = ["GET", "POST", "PUT", "DELETE"]
/// allowed_headers = ["content-type", "authorization"]
/// exposed_headers = ["request-id", "x-request-id"]
/// max_age = "1h"
/// debug = false
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HttpCorsConfig {
    /// Whether to allow credentials (cookies, authorization headers) in CORS requests.
    pub allow_credentials: Option<bool>,

    /// Origins allowed to make CORS requests, e.g. `https://app.example.com`.
    pub allowed_origins: Option<Vec<String>>,

    /// HTTP methods allowed in CORS requests.
    pub allowed_methods: Option<Vec<CorsMethod>>,

    /// Request headers allowed in CORS requests.
    pub allowed_headers: Option<Vec<CorsHeader>>,

    /// Response headers the browser lets scripts read.
    pub exposed_headers: Option<Vec<CorsHeader>>,

    /// How long browsers may cache a preflight response, e.g. `"1h"`.
    #[serde(default, with = "humantime_serde")]
    pub max_age: Option<Duration>,

    /// Logs every cross-origin request and the origin it was granted.
    #[serde(default)]
    pub debug: bool,
}

impl HttpCorsConfig {
    /// Enables credentials (cookies, authorization headers) in CORS requests.
    ///
    /// ```rust
    /// use axum_httpserver::HttpCorsConfig;
    ///
    /// let cors = HttpCorsConfig::default()
    ///     .with_allow_credentials()
    ///     .with_allowed_origins(vec!["https://app.example.com".into()]);
    /// ```
    pub fn with_allow_credentials(mut self) -> Self {
        self.allow_credentials = Some(true);
        self
    }

    /// Sets the list of origins allowed to make CORS requests.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }

    /// Sets the HTTP methods allowed in CORS requests.
    pub fn with_allowed_methods(mut self, methods: Vec<Method>) -> Self {
        self.allowed_methods = Some(methods.into_iter().map(CorsMethod).collect());
        self
    }

    /// Sets the headers allowed in CORS requests.
    pub fn with_allowed_headers(mut self, headers: Vec<HeaderName>) -> Self {
        self.allowed_headers = Some(headers.into_iter().map(CorsHeader).collect());
        self
    }

    /// Sets the headers exposed to the browser in CORS responses.
    pub fn with_exposed_headers(mut self, headers: Vec<HeaderName>) -> Self {
        self.exposed_headers = Some(headers.into_iter().map(CorsHeader).collect());
        self
    }

    /// Sets the maximum time browsers should cache CORS preflight responses.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Turns on per-request CORS logging.
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

/// HTTP method deserialized from a string such as `"GET"`.
#[derive(Debug, Clone)]
pub struct CorsMethod(pub Method);

impl<'de> Deserialize<'de> for CorsMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let method = Method::from_str(&s).map_err(serde::de::Error::custom)?;
        Ok(CorsMethod(method))
    }
}

/// HTTP header name deserialized from a string such as `"content-type"`.
#[derive(Debug, Clone)]
pub struct CorsHeader(pub HeaderName);

impl<'de> Deserialize<'de> for CorsHeader {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let header = HeaderName::from_str(&s).map_err(serde::de::Error::custom)?;
        Ok(CorsHeader(header))
    }
}
