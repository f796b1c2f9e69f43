//! Field mappings of the response builders.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use mockingjay::builders::{
    self, failure, json, json_data, ok, redirect, text, unspecified_failure,
};
use mockingjay::{Download, Request, Response, StubFailure};

fn request(url: &str) -> Request {
    Request::get(url).body(()).unwrap()
}

#[test]
fn test_failure() {
    let error = StubFailure::new("MockingjayTests", 0);

    let response = failure(error.clone()).respond(&request("http://test.com/"));

    assert_eq!(response, Response::Failure(error));
}

#[test]
fn test_unspecified_failure() {
    let response = unspecified_failure().respond(&request("http://test.com/"));

    match response {
        Response::Success(..) => panic!("Unexpected success"),
        Response::Failure(error) => assert_eq!(error, StubFailure::unspecified()),
    }
}

#[test]
fn test_http() {
    let response = ok().respond(&request("http://test.com/"));

    match response {
        Response::Success(response, _) => assert_eq!(response.status_code(), 200),
        Response::Failure(error) => panic!("Unexpected failure: {error}"),
    }
}

#[test]
fn test_http_download_stream() {
    let response = builders::http(
        StatusCode::OK,
        HeaderMap::new(),
        Download::stream_content(Bytes::new(), 1024),
    )
    .respond(&request("http://test.com/"));

    match response {
        Response::Success(_, Download::StreamContent { chunk_size, .. }) => {
            assert_eq!(chunk_size, 1024)
        }
        other => panic!("Expected streamed content, got {other:?}"),
    }
}

#[test]
fn test_text() {
    let response = text("Hello World", encoding_rs::UTF_8).respond(&request("http://test.com/"));

    match response {
        Response::Success(response, Download::Content(data)) => {
            assert_eq!(response.status_code(), 200);
            assert_eq!(response.mime_type().as_deref(), Some("text/plain"));
            assert_eq!(response.text_encoding_name().as_deref(), Some("utf-8"));
            assert_eq!(std::str::from_utf8(&data).unwrap(), "Hello World");
        }
        other => panic!("Expected content, got {other:?}"),
    }
}

#[test]
fn test_json() {
    let response = json(&["A"]).respond(&request("http://test.com/"));

    match response {
        Response::Success(response, Download::Content(data)) => {
            assert_eq!(response.status_code(), 200);
            assert_eq!(response.mime_type().as_deref(), Some("application/json"));
            assert_eq!(response.text_encoding_name().as_deref(), Some("utf-8"));
            assert_eq!(std::str::from_utf8(&data).unwrap(), r#"["A"]"#);
        }
        other => panic!("Expected content, got {other:?}"),
    }
}

#[test]
fn test_json_data() {
    let response = json_data(r#"["B"]"#).respond(&request("http://test.com"));

    match response {
        Response::Success(response, Download::Content(data)) => {
            assert_eq!(response.status_code(), 200);
            assert_eq!(response.mime_type().as_deref(), Some("application/json"));
            assert_eq!(response.text_encoding_name().as_deref(), Some("utf-8"));
            assert_eq!(std::str::from_utf8(&data).unwrap(), r#"["B"]"#);
        }
        other => panic!("Expected content, got {other:?}"),
    }
}

#[test]
fn test_redirect() {
    let response = redirect("https://example.com").respond(&request("http://example.com"));

    match response {
        Response::Success(response, _) => {
            assert_eq!(response.status_code(), 301);
            assert_eq!(response.header("Location"), Some("https://example.com"));
        }
        Response::Failure(error) => panic!("Unexpected failure: {error}"),
    }
}

#[test]
fn test_relative_redirect() {
    let response = redirect("/authorize").respond(&request("https://example.com"));

    match response {
        Response::Success(response, _) => {
            assert_eq!(response.status_code(), 301);
            assert_eq!(response.header("Location"), Some("/authorize"));
        }
        Response::Failure(error) => panic!("Unexpected failure: {error}"),
    }
}

#[test]
fn test_builders_are_pure() {
    let builder = json(&serde_json::json!({"id": 1}));
    let request = request("http://test.com/users/1");

    assert_eq!(builder.respond(&request), builder.respond(&request));
}
