//! The request type handed to every handler.
//!
//! A [`Request`] is an `http::Request` whose query string already contains the
//! route's path parameters, so `/users/{id}` matched by `/users/42?tab=posts`
//! reads as `id=42` and `tab=posts` through the same [`Request::query`] call.

use {
    crate::{Error, Result, middleware::request_id::RequestIds},
    axum::body::Body,
    bytes::Bytes,
    http::{Extensions, HeaderMap, Method, Uri, uri::PathAndQuery},
    serde::de::DeserializeOwned,
};

/// Largest body [`Request::bytes`] and [`Request::json`] will buffer.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug)]
pub struct Request {
    inner: http::Request<Body>,
    query: Vec<(String, String)>,
}

impl Request {
    /// Wraps an `http::Request` as is.
    ///
    /// No correlation ids are attached, so the response helpers answer such a
    /// request with a bare 500. Requests reaching a registered route always
    /// carry them.
    pub fn from_http(inner: http::Request<Body>) -> Self {
        let query = parse_query(inner.uri().query());
        Self { inner, query }
    }

    /// Appends path parameters to the query string, after the pairs the client sent.
    pub(crate) fn with_path_params<'a, I>(mut inner: http::Request<Body>, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = parse_query(inner.uri().query());
        let before = query.len();
        query.extend(params.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())));

        if query.len() != before {
            match rewrite_query(inner.uri(), &query) {
                Ok(uri) => *inner.uri_mut() = uri,
                Err(err) => tracing::warn!(error = %err, "could not merge path params into uri"),
            }
        }

        Self { inner, query }
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }

    /// First value of the query parameter `key`, path parameters included.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_all(key).next()
    }

    /// Every value of the query parameter `key`, in order.
    pub fn query_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All decoded query pairs.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Correlation ids resolved for this request.
    pub fn ids(&self) -> Option<&RequestIds> {
        self.inner.extensions().get::<RequestIds>()
    }

    /// The `Request-Id` this request is logged under.
    pub fn request_id(&self) -> Option<&str> {
        self.ids().map(RequestIds::request_id)
    }

    /// The `X-Request-Id` the client sent, if any.
    pub fn x_request_id(&self) -> Option<&str> {
        self.ids().and_then(RequestIds::x_request_id)
    }

    /// Takes and buffers the body, up to [`DEFAULT_BODY_LIMIT`] bytes.
    ///
    /// The request keeps its headers and ids, so it can still be passed to
    /// the response helpers; a second call reads an empty body.
    pub async fn bytes(&mut self) -> Result<Bytes> {
        let body = std::mem::take(self.inner.body_mut());
        axum::body::to_bytes(body, DEFAULT_BODY_LIMIT)
            .await
            .map_err(|err| Error::invalid_input(format!("could not read request body: {err}")))
    }

    /// Buffers the body and decodes it as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| Error::invalid_input(format!("invalid JSON body: {err}")))
    }

    pub fn into_inner(self) -> http::Request<Body> {
        self.inner
    }
}

impl From<http::Request<Body>> for Request {
    fn from(inner: http::Request<Body>) -> Self {
        Self::from_http(inner)
    }
}

fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect(),
        None => Vec::new(),
    }
}

fn rewrite_query(uri: &Uri, query: &[(String, String)]) -> std::result::Result<Uri, http::Error> {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    let path_and_query = PathAndQuery::try_from(format!("{}?{}", uri.path(), encoded))?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Ok(Uri::from_parts(parts)?)
}
