//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Bodies are passed on byte for byte, only the logged copy is decoded
/// as text.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_request(&parts, &body_text(&body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn body_text(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// The longest prefix of `body` that is at most [LOG_BODY_LENGTH_LIMIT]
/// bytes and ends on a character boundary.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_middleware_tests {
    use axum::{Router, body::Bytes, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;

    use crate::logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware, truncate_body};

    #[test]
    fn short_body_is_not_truncated() {
        assert_eq!(truncate_body("hello"), "hello");
    }

    #[test]
    fn long_body_is_truncated_to_limit() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        assert_eq!(truncate_body(&body).len(), LOG_BODY_LENGTH_LIMIT);
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        // Each emoji is four bytes, so the limit falls inside one.
        let body = format!("a{}", "💰".repeat(LOG_BODY_LENGTH_LIMIT));

        let got = truncate_body(&body);

        assert!(got.len() <= LOG_BODY_LENGTH_LIMIT);
        assert_eq!(got.len(), 61);
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server");
        let body = "x".repeat(LOG_BODY_LENGTH_LIMIT + 10);

        let response = server.post("/echo").text(body.clone()).await;

        response.assert_status_ok();
        response.assert_text(body);
    }

    #[tokio::test]
    async fn passes_non_utf8_bytes_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: Bytes| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server");
        let body = Bytes::from_static(&[b'{', 0xff, 0xfe, b'}']);

        let response = server.post("/echo").bytes(body.clone()).await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes(), &body);
    }

    #[tokio::test]
    async fn non_utf8_text_body_is_rejected() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server");

        let response = server
            .post("/echo")
            .bytes(Bytes::from_static(&[0xff, 0xfe]))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
