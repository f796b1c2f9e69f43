//! Request handler for the stub server.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::HOST, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::intercept::{into_http_response, request_view};
use crate::response::{Response as Canned, StubFailure};
use crate::stubs::Stubs;

/// Header naming the `domain:code` of a stubbed failure.
///
/// Failures cannot travel over HTTP as transport errors, so the server
/// answers them with `502 Bad Gateway`, this header, and the error message
/// as the body.
pub const FAILURE_HEADER: &str = "x-mockingjay-failure";

/// Fallback for every route: answer from the registry.
pub async fn answer(State(stubs): State<Stubs>, request: Request) -> Response {
    let mut view = request_view(&request);
    *view.uri_mut() = absolute_uri(&request);

    let Some(stub) = stubs.find(&view) else {
        tracing::warn!(method = %view.method(), uri = %view.uri(), "unmatched request");
        return (
            StatusCode::NOT_FOUND,
            format!("No stub matches {} {}", view.method(), view.uri()),
        )
            .into_response();
    };

    tracing::debug!(
        id = %stub.id(),
        matcher = stub.description(),
        method = %view.method(),
        uri = %view.uri(),
        "stubbing request"
    );

    if let Some(delay) = stub.delay() {
        tokio::time::sleep(delay).await;
    }

    match stub.respond(&view) {
        Canned::Success(head, download) => into_http_response(head, download).map(Body::new),
        Canned::Failure(error) => failure_response(&error),
    }
}

/// The URL the client asked for.
///
/// Proxied requests arrive in absolute form; direct ones are rebuilt from
/// the `Host` header.
fn absolute_uri<B>(request: &Request<B>) -> Uri {
    let uri = request.uri();
    if uri.scheme().is_some() {
        return uri.clone();
    }

    let Some(host) = request.headers().get(HOST).and_then(|h| h.to_str().ok()) else {
        return uri.clone();
    };
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    format!("http://{host}{path}")
        .parse()
        .unwrap_or_else(|_| uri.clone())
}

fn failure_response(error: &StubFailure) -> Response {
    let mut response = (StatusCode::BAD_GATEWAY, error.to_string()).into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("{}:{}", error.domain, error.code)) {
        response.headers_mut().insert(FAILURE_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_form_is_kept() {
        let request = http::Request::get("http://api.test/users?page=2").body(()).unwrap();
        assert_eq!(absolute_uri(&request), "http://api.test/users?page=2");
    }

    #[test]
    fn test_origin_form_uses_host_header() {
        let request = http::Request::get("/users?page=2")
            .header(HOST, "127.0.0.1:4000")
            .body(())
            .unwrap();
        assert_eq!(absolute_uri(&request), "http://127.0.0.1:4000/users?page=2");
    }

    #[test]
    fn test_origin_form_without_host() {
        let request = http::Request::get("/users").body(()).unwrap();
        assert_eq!(absolute_uri(&request), "/users");
    }

    #[test]
    fn test_failure_response() {
        let response = failure_response(&StubFailure::new("network", -1009));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[FAILURE_HEADER], "network:-1009");
    }
}
