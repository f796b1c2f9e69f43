//! Response builders.
//!
//! Each function here captures a declarative description (an error, a
//! status code, headers, a body) and returns a [`Builder`] that maps any
//! [`Request`] onto the corresponding [`Response`]. Builders are pure: they
//! never touch the network and produce the same value for the same request.
//!
//! # Example
//!
//! ```
//! use mockingjay::builders::{json, redirect};
//! use mockingjay::Request;
//!
//! let request = Request::get("http://test.com/").body(()).unwrap();
//!
//! let response = json(&["A"]).respond(&request);
//! assert_eq!(response.http_response().unwrap().status_code(), 200);
//!
//! let response = redirect("/authorize").respond(&request);
//! assert_eq!(response.http_response().unwrap().location(), Some("/authorize"));
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use encoding_rs::Encoding;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

use crate::response::{Download, HttpResponse, Request, Response, StubFailure};

/// Failure domain for bodies that could not be serialized.
pub const JSON_FAILURE_DOMAIN: &str = "mockingjay.json";

/// Failure domain for builder inputs that cannot form a valid response.
pub const BUILDER_FAILURE_DOMAIN: &str = "mockingjay.builder";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A canned-response factory.
///
/// Cheap to clone; clones share the captured inputs.
#[derive(Clone)]
pub struct Builder(Arc<dyn Fn(&Request) -> Response + Send + Sync>);

impl Builder {
    /// Wrap an arbitrary function as a builder.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Produce the response for `request`.
    pub fn respond(&self, request: &Request) -> Response {
        (self.0)(request)
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder").finish_non_exhaustive()
    }
}

/// Fail every request with `error`.
pub fn failure(error: StubFailure) -> Builder {
    Builder::new(move |_| Response::Failure(error.clone()))
}

/// Fail every request with [`StubFailure::unspecified`].
pub fn unspecified_failure() -> Builder {
    failure(StubFailure::unspecified())
}

/// Succeed with `status`, `headers` and `download`.
pub fn http(status: StatusCode, headers: HeaderMap, download: Download) -> Builder {
    Builder::new(move |request| {
        let response = HttpResponse::new(request.uri().to_string(), status, headers.clone());
        Response::Success(response, download.clone())
    })
}

/// An empty `200 OK`.
pub fn ok() -> Builder {
    http(StatusCode::OK, HeaderMap::new(), Download::NoContent)
}

/// `200 OK` with `body` serialized as JSON.
pub fn json<T: Serialize + ?Sized>(body: &T) -> Builder {
    json_with(body, StatusCode::OK, HeaderMap::new())
}

/// JSON response with a custom status and extra headers.
///
/// If `body` cannot be serialized the builder fails every request with a
/// [`JSON_FAILURE_DOMAIN`] error.
pub fn json_with<T: Serialize + ?Sized>(
    body: &T,
    status: StatusCode,
    headers: HeaderMap,
) -> Builder {
    match serde_json::to_vec(body) {
        Ok(data) => json_data_with(data, status, headers),
        Err(err) => failure(StubFailure::new(JSON_FAILURE_DOMAIN, 0).with_message(err.to_string())),
    }
}

/// `200 OK` with an already serialized JSON body.
pub fn json_data(data: impl Into<Bytes>) -> Builder {
    json_data_with(data, StatusCode::OK, HeaderMap::new())
}

/// Already serialized JSON with a custom status and extra headers.
///
/// `Content-Type` is always `application/json; charset=utf-8`.
pub fn json_data_with(
    data: impl Into<Bytes>,
    status: StatusCode,
    mut headers: HeaderMap,
) -> Builder {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    http(status, headers, Download::Content(data.into()))
}

/// `200 OK` with `text` encoded as `encoding`.
pub fn text(text: &str, encoding: &'static Encoding) -> Builder {
    text_with(text, encoding, StatusCode::OK, HeaderMap::new())
}

/// Plain text with a custom status and extra headers.
///
/// Encodings that cannot be produced as output (UTF-16) are replaced by
/// the encoding actually used, and the charset reports that one.
pub fn text_with(
    text: &str,
    encoding: &'static Encoding,
    status: StatusCode,
    mut headers: HeaderMap,
) -> Builder {
    let (data, used, _) = encoding.encode(text);
    let content_type = format!("text/plain; charset={}", used.name().to_ascii_lowercase());

    match HeaderValue::from_str(&content_type) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
            http(status, headers, Download::Content(Bytes::from(data.into_owned())))
        }
        Err(_) => invalid_input(format!("unusable content type '{content_type}'")),
    }
}

/// `301 Moved Permanently` pointing at `location`.
///
/// `location` is used verbatim, so relative targets such as `/authorize`
/// stay relative.
pub fn redirect(location: &str) -> Builder {
    redirect_with(location, StatusCode::MOVED_PERMANENTLY, HeaderMap::new())
}

/// Redirect with a custom status and extra headers.
pub fn redirect_with(location: &str, status: StatusCode, mut headers: HeaderMap) -> Builder {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
            http(status, headers, Download::NoContent)
        }
        Err(_) => invalid_input(format!("invalid redirect location '{}'", location.escape_debug())),
    }
}

fn invalid_input(reason: String) -> Builder {
    failure(StubFailure::new(BUILDER_FAILURE_DOMAIN, 0).with_message(reason))
}
