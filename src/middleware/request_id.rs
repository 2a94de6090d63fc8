//! Correlation ids.
//!
//! Every request reaching a route leaves this step with a `Request-Id`
//! header: the one the client sent, else a copy of its `X-Request-Id`, else a
//! freshly generated UUIDv7. The resolved values are stored in the request
//! extensions as [`RequestIds`] and echoed on every response built by the
//! response helpers.

use {
    crate::utils::generate_request_id,
    http::{HeaderMap, HeaderName, HeaderValue},
};

pub const REQUEST_ID: HeaderName = HeaderName::from_static("request-id");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The correlation ids resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIds {
    request_id: String,
    x_request_id: Option<String>,
}

impl RequestIds {
    pub fn new(request_id: impl Into<String>, x_request_id: Option<String>) -> Self {
        Self {
            request_id: request_id.into(),
            x_request_id,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn x_request_id(&self) -> Option<&str> {
        self.x_request_id.as_deref()
    }
}

/// Resolves the correlation ids of a request and makes sure its headers
/// carry a `Request-Id`.
///
/// Header values that are empty or not visible ASCII count as absent.
pub fn inject_request_id(headers: &mut HeaderMap) -> RequestIds {
    let request_id = header_str(headers, &REQUEST_ID);
    let x_request_id = header_str(headers, &X_REQUEST_ID);

    let request_id = match (request_id, &x_request_id) {
        (Some(id), _) => id,
        (None, Some(x_id)) => x_id.clone(),
        (None, None) => generate_request_id(),
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID, value);
    }

    RequestIds::new(request_id, x_request_id)
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_when_absent() {
        let mut headers = HeaderMap::new();
        let ids = inject_request_id(&mut headers);

        assert_eq!(ids.request_id().len(), 36);
        assert_eq!(ids.x_request_id(), None);
        assert_eq!(headers.get(REQUEST_ID).unwrap(), ids.request_id());
    }

    #[test]
    fn copies_x_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        let ids = inject_request_id(&mut headers);

        assert_eq!(ids.request_id(), "abc-123");
        assert_eq!(ids.x_request_id(), Some("abc-123"));
        assert_eq!(headers.get(REQUEST_ID).unwrap(), "abc-123");
    }

    #[test]
    fn keeps_existing_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID, HeaderValue::from_static("mine"));
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("theirs"));
        let ids = inject_request_id(&mut headers);

        assert_eq!(ids.request_id(), "mine");
        assert_eq!(ids.x_request_id(), Some("theirs"));
        assert_eq!(headers.get_all(REQUEST_ID).iter().count(), 1);
    }

    #[test]
    fn empty_headers_count_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID, HeaderValue::from_static(""));
        headers.insert(X_REQUEST_ID, HeaderValue::from_static(""));
        let ids = inject_request_id(&mut headers);

        assert!(!ids.request_id().is_empty());
        assert_eq!(ids.x_request_id(), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Request-ID").unwrap(),
            HeaderValue::from_static("upper"),
        );
        assert_eq!(inject_request_id(&mut headers).request_id(), "upper");
    }
}
