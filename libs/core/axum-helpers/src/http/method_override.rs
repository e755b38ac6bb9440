use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use tower::{Layer, Service};
use tracing::{debug, warn};
use url::form_urlencoded;

/// Field (or query parameter) carrying the intended method.
pub const OVERRIDE_FIELD: &str = "_method";

/// Largest form body buffered while looking for the override field.
pub const MAX_FORM_BYTES: usize = 64 * 1024;

/// Rewrites `POST` requests that carry `_method=PUT|PATCH|DELETE`, either in
/// the query string or in an `application/x-www-form-urlencoded` body.
///
/// Routing must happen after this runs, so it has to wrap the router from the
/// outside (see [`with_method_override`]) rather than be added with
/// `Router::layer`. The body is buffered and handed on unchanged.
pub async fn method_override(request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();

    if let Some(method) = parts.uri.query().and_then(|q| find_override(q.as_bytes())) {
        debug!(%method, uri = %parts.uri, "Method override from query string");
        parts.method = method;
        return next.run(Request::from_parts(parts, body)).await;
    }

    if !is_urlencoded_form(&parts.headers) {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Rejecting form body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    if let Some(method) = find_override(&bytes) {
        debug!(%method, uri = %parts.uri, "Method override from form field");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Wraps `router` so [`method_override`] runs before route matching.
pub fn with_method_override(
    router: Router,
) -> impl Service<Request, Response = Response, Error = Infallible, Future: Send> + Clone + Send + 'static
{
    middleware::from_fn(method_override).layer(router)
}

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn find_override(input: &[u8]) -> Option<Method> {
    form_urlencoded::parse(input)
        .filter(|(key, _)| key == OVERRIDE_FIELD)
        .find_map(|(_, value)| match value.trim().to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{delete, post, put};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn echo(method: Method, body: String) -> String {
        format!("{method} {body}")
    }

    fn app() -> impl Service<Request, Response = Response, Error = Infallible, Future: Send> + Clone {
        with_method_override(
            Router::new()
                .route("/items", post(echo))
                .route("/items/{id}", put(echo).delete(echo))
                .route("/other", delete(echo)),
        )
    }

    async fn send(request: Request) -> (StatusCode, String) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn form_post(uri: &str, body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_form_field_overrides_method_and_keeps_body() {
        let (status, body) = send(form_post("/items/1", "_method=PUT&name=Widget")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "PUT _method=PUT&name=Widget");
    }

    #[tokio::test]
    async fn test_override_is_case_insensitive() {
        let (status, body) = send(form_post("/items/1", "_method=delete")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("DELETE"));
    }

    #[tokio::test]
    async fn test_query_string_override() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/other?_method=DELETE")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("DELETE"));
    }

    #[tokio::test]
    async fn test_unsupported_override_is_ignored() {
        let (status, body) = send(form_post("/items", "_method=GET&name=x")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("POST"));
    }

    #[tokio::test]
    async fn test_get_requests_are_untouched() {
        let request = Request::builder()
            .uri("/items/1?_method=DELETE")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_non_form_bodies_are_not_inspected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/items")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("_method=DELETE"))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "POST _method=DELETE");
    }

    #[tokio::test]
    async fn test_oversized_form_is_rejected() {
        let body = format!("name={}", "x".repeat(MAX_FORM_BYTES));
        let (status, _) = send(form_post("/items", &body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
