use {crate::HttpCorsConfig, axum::Router};

#[cfg(feature = "cors")]
use {
    axum::{extract::Request, middleware::Next, response::Response},
    http::{HeaderName, HeaderValue, Method, header},
    tower_http::cors::{AllowOrigin, Any, CorsLayer},
};

/// Wraps `router` in the CORS policy of `config`. Without a config the
/// router is returned untouched and no CORS header is ever sent.
#[cfg(feature = "cors")]
pub(super) fn apply(router: Router, config: Option<&HttpCorsConfig>) -> Router {
    let Some(config) = config else {
        return router;
    };

    let router = router.layer(layer(config));
    if config.debug {
        router.layer(axum::middleware::from_fn(log_cors_request))
    } else {
        router
    }
}

#[cfg(not(feature = "cors"))]
pub(super) fn apply(router: Router, config: Option<&HttpCorsConfig>) -> Router {
    if config.is_some() {
        tracing::warn!(
            "CORS is configured but the 'cors' feature is not enabled. \
             Add `cors` to your Cargo.toml features to enable CORS support."
        );
    }
    router
}

#[cfg(feature = "cors")]
fn layer(config: &HttpCorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    // Wildcards cannot be combined with credentials
    let has_credentials = config.allow_credentials.unwrap_or(false);

    if let Some(origins) = &config.allowed_origins {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors = cors.allow_origin(AllowOrigin::list(origins));
    } else if !has_credentials {
        cors = cors.allow_origin(Any);
    }

    if let Some(methods) = &config.allowed_methods {
        let methods: Vec<Method> = methods.iter().map(|m| m.0.clone()).collect();
        cors = cors.allow_methods(methods);
    } else if !has_credentials {
        cors = cors.allow_methods(Any);
    }

    if let Some(headers) = &config.allowed_headers {
        let headers: Vec<HeaderName> = headers.iter().map(|h| h.0.clone()).collect();
        cors = cors.allow_headers(headers);
    } else if !has_credentials {
        cors = cors.allow_headers(Any);
    }

    if let Some(headers) = &config.exposed_headers {
        let headers: Vec<HeaderName> = headers.iter().map(|h| h.0.clone()).collect();
        cors = cors.expose_headers(headers);
    }

    if let Some(max_age) = config.max_age {
        cors = cors.max_age(max_age);
    }

    if has_credentials {
        cors = cors.allow_credentials(true);
    }

    cors
}

#[cfg(feature = "cors")]
async fn log_cors_request(req: Request, next: Next) -> Response {
    let Some(origin) = req.headers().get(header::ORIGIN).cloned() else {
        return next.run(req).await;
    };
    let method = req.method().clone();
    let preflight = method == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let response = next.run(req).await;

    let granted = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>");
    tracing::debug!(
        origin = ?origin,
        method = %method,
        preflight,
        allow_origin = %granted,
        "cors request"
    );
    response
}
