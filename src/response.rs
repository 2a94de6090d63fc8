//! Response helpers.
//!
//! Every helper stamps the response with a `Date` header and the request's
//! correlation ids (`Request-Id`, plus `X-Request-Id` when the client sent
//! one). A request that never went through a registered route has no ids;
//! the helpers answer it with a bare `500`.
//!
//! | Helper | Content-Type |
//! |--------|--------------|
//! | [`respond`] | none |
//! | [`respond_json`] | `application/json` |
//! | [`respond_string`] | `text/plain; charset=utf-8` |
//! | [`respond_html`], [`respond_multi_html`] | `text/html; charset=utf-8` |

use {
    crate::{
        Request, Result,
        middleware::request_id::{REQUEST_ID, RequestIds, X_REQUEST_ID},
        template,
        utils::http_date,
    },
    axum::{
        body::Body,
        response::{IntoResponse, Response},
    },
    bytes::Bytes,
    chrono::Utc,
    gtmpl::{Func, Value},
    http::{HeaderValue, StatusCode, header},
    serde::Serialize,
    std::{collections::HashMap, fmt::Display},
};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Writes `body` as is, with no `Content-Type`.
pub fn respond(req: &Request, status: StatusCode, body: impl Into<Bytes>) -> Response {
    write_response(req.ids(), status, None, body.into())
}

/// Serializes `value` and writes it as `application/json`.
///
/// Nothing is written when serialization fails: the error is returned and
/// the handler decides what to answer.
pub fn respond_json<T>(req: &Request, status: StatusCode, value: &T) -> Result<Response>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;
    Ok(write_response(
        req.ids(),
        status,
        Some(CONTENT_TYPE_JSON),
        body.into(),
    ))
}

/// Writes the text form of `value` as `text/plain`.
pub fn respond_string(req: &Request, status: StatusCode, value: impl Display) -> Response {
    write_response(
        req.ids(),
        status,
        Some(CONTENT_TYPE_TEXT),
        value.to_string().into(),
    )
}

/// Renders a single template and writes it with status 200.
///
/// See [`render_html`](crate::render_html) for the template syntax.
pub fn respond_html(
    req: &Request,
    name: &str,
    text: &str,
    data: impl Into<Value>,
    funcs: &[(&str, Func)],
) -> Result<Response> {
    let html = template::render_html(name, text, data, funcs)?;
    Ok(write_response(
        req.ids(),
        StatusCode::OK,
        Some(CONTENT_TYPE_HTML),
        html.into_string().into(),
    ))
}

/// Renders `main` out of a set of named templates and writes it with status 200.
pub fn respond_multi_html(
    req: &Request,
    main: &str,
    templates: &HashMap<String, String>,
    data: impl Into<Value>,
    funcs: &[(&str, Func)],
) -> Result<Response> {
    let html = template::render_multi_html(main, templates, data, funcs)?;
    Ok(write_response(
        req.ids(),
        StatusCode::OK,
        Some(CONTENT_TYPE_HTML),
        html.into_string().into(),
    ))
}

pub(crate) fn write_response(
    ids: Option<&RequestIds>,
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Bytes,
) -> Response {
    let Some(ids) = ids else {
        tracing::error!("response requested for a request without correlation ids");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    if let Ok(date) = HeaderValue::from_str(&http_date(Utc::now())) {
        headers.insert(header::DATE, date);
    }
    if let Ok(id) = HeaderValue::from_str(ids.request_id()) {
        headers.insert(REQUEST_ID, id);
    }
    if let Some(Ok(x_id)) = ids.x_request_id().map(HeaderValue::from_str) {
        headers.insert(X_REQUEST_ID, x_id);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn request_with_ids(x_request_id: Option<&str>) -> Request {
        let mut inner = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        inner.extensions_mut().insert(RequestIds::new(
            "0190b1a2-0000-7000-8000-000000000001",
            x_request_id.map(str::to_owned),
        ));
        Request::from_http(inner)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn respond_writes_raw_body_and_ids() {
        let req = request_with_ids(None);
        let response = respond(&req, StatusCode::CREATED, "raw");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(response.headers().get(header::DATE).is_some());
        assert_eq!(
            response.headers().get("request-id").unwrap(),
            "0190b1a2-0000-7000-8000-000000000001"
        );
        assert!(response.headers().get("x-request-id").is_none());
        assert_eq!(body_string(response).await, "raw");
    }

    #[test]
    fn x_request_id_is_echoed_when_sent() {
        let req = request_with_ids(Some("client-42"));
        let response = respond(&req, StatusCode::OK, Bytes::new());
        assert_eq!(response.headers().get("x-request-id").unwrap(), "client-42");
    }

    #[test]
    fn date_header_is_rfc7231() {
        let response = respond(&request_with_ids(None), StatusCode::OK, "");
        let date = response.headers().get(header::DATE).unwrap().to_str().unwrap();
        assert!(date.ends_with(" GMT"));
        assert!(chrono::NaiveDateTime::parse_from_str(date, crate::utils::HTTP_DATE_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn missing_ids_is_bare_500() {
        let req = Request::from_http(http::Request::builder().uri("/").body(Body::empty()).unwrap());
        let response = respond_string(&req, StatusCode::OK, "never sent");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get("request-id").is_none());
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn json_body_and_content_type() {
        let req = request_with_ids(None);
        let response =
            respond_json(&req, StatusCode::OK, &serde_json::json!({"hello": "world"})).unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE_JSON
        );
        assert_eq!(body_string(response).await, r#"{"hello":"world"}"#);
    }

    #[test]
    fn unserializable_json_is_an_error() {
        let req = request_with_ids(None);
        let value = HashMap::from([((1, 2), 3)]);
        let err = respond_json(&req, StatusCode::OK, &value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn string_is_plain_text() {
        let req = request_with_ids(None);
        let response = respond_string(&req, StatusCode::NOT_FOUND, 404);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE_TEXT
        );
        assert_eq!(body_string(response).await, "404");
    }

    #[tokio::test]
    async fn html_renders_template() {
        let req = request_with_ids(None);
        let data = HashMap::from([("Name".to_owned(), "World".to_owned())]);
        let response = respond_html(&req, "hello", "<p>Hello {{.Name}}</p>", data, &[]).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE_HTML
        );
        assert_eq!(body_string(response).await, "<p>Hello World</p>");
    }

    #[test]
    fn html_parse_error_writes_nothing() {
        let req = request_with_ids(None);
        let err = respond_html(&req, "broken", "{{.Name", Value::Nil, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Template);
    }

    #[tokio::test]
    async fn multi_html_renders_main() {
        let req = request_with_ids(None);
        let templates = HashMap::from([
            ("main".to_owned(), r#"{{template "frag"}}"#.to_owned()),
            ("frag".to_owned(), "X".to_owned()),
        ]);
        let response = respond_multi_html(&req, "main", &templates, Value::Nil, &[]).unwrap();
        assert_eq!(body_string(response).await, "X");
    }
}
