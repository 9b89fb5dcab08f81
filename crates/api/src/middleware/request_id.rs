//! Request correlation IDs.
//!
//! An `x-request-id` set by an upstream proxy is kept; otherwise a UUID v4 is
//! minted. The ID ends up in the request span, the Sentry scope and the
//! response headers.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request ID.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream ID we accept as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

fn request_id_for(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

/// Middleware that tags every request with an ID.
///
/// Must run inside the `TraceLayer` span, which declares an empty
/// `request_id` field for this to fill.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id_for(&request);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_upstream_id_is_kept() {
        assert_eq!(request_id_for(&request_with(Some("cf-1234"))), "cf-1234");
    }

    #[test]
    fn test_missing_or_oversized_id_is_replaced() {
        let minted = request_id_for(&request_with(None));
        assert!(Uuid::parse_str(&minted).is_ok());

        let huge = "x".repeat(MAX_UPSTREAM_ID_LEN + 1);
        let replaced = request_id_for(&request_with(Some(&huge)));
        assert!(Uuid::parse_str(&replaced).is_ok());
    }
}
