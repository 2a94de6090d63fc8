use {
    crate::{Error, Handler, Request, Result},
    axum::{body::Body, response::Response},
    futures::future::BoxFuture,
    http::{StatusCode, Uri},
    std::path::{Path, PathBuf},
    tower::ServiceExt,
    tower_http::services::ServeDir,
    url::Url,
};

/// Suffix every static file route must end with. The captured part is read
/// back from the `filepath` query parameter.
pub const FILEPATH_WILDCARD: &str = "/{*filepath}";

const FILEPATH_PARAM: &str = "filepath";

pub(super) fn check_pattern(path: &str) -> Result<()> {
    if path.ends_with(FILEPATH_WILDCARD) {
        Ok(())
    } else {
        Err(Error::config(format!(
            "path must end with {FILEPATH_WILDCARD} in path {path:?}"
        )))
    }
}

/// Serves files from a directory, the file being named by the `filepath`
/// parameter of the request.
///
/// Lookup and response headers (`Content-Type`, `Last-Modified`, ranges)
/// come from [`ServeDir`]. Paths escaping the root are not served.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Handler for StaticFiles {
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let service = ServeDir::new(&self.root);
        Box::pin(async move {
            // The captured wildcard is appended after the client's own query
            // pairs, so the last value is the one from the route.
            let file = req
                .query_all(FILEPATH_PARAM)
                .last()
                .unwrap_or_default()
                .to_owned();

            let mut inner = req.into_inner();
            match file_uri(&file) {
                Some(uri) => *inner.uri_mut() = uri,
                None => {
                    tracing::debug!(filepath = %file, "rejected static file path");
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::BAD_REQUEST;
                    return response;
                }
            }

            match service.oneshot(inner).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        })
    }
}

/// Percent-encodes `file` as an absolute request path, dot segments resolved.
fn file_uri(file: &str) -> Option<Uri> {
    let mut url = Url::parse("http://localhost/").ok()?;
    url.set_path(file);
    url.path().parse().ok()
}
