//! Canned response values.
//!
//! A [`Builder`](crate::Builder) turns a [`Request`] into a [`Response`]:
//! either a successful [`HttpResponse`] with a [`Download`] describing the
//! body, or a [`StubFailure`] that the interception layer reports in place
//! of a network error.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, StatusCode};
use thiserror::Error;

/// The view of an outgoing request that builders and matchers receive.
///
/// Only the head is carried; stubs never consume the request body.
pub type Request = http::Request<()>;

/// The result of running a builder against a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A response head plus a description of its body.
    Success(HttpResponse, Download),
    /// The request fails with the given error.
    Failure(StubFailure),
}

impl Response {
    /// Returns `true` for the success arm.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(..))
    }

    /// The response head, if this is a success.
    pub fn http_response(&self) -> Option<&HttpResponse> {
        match self {
            Response::Success(response, _) => Some(response),
            Response::Failure(_) => None,
        }
    }

    /// The body description, if this is a success.
    pub fn download(&self) -> Option<&Download> {
        match self {
            Response::Success(_, download) => Some(download),
            Response::Failure(_) => None,
        }
    }

    /// The failure, if this is one.
    pub fn failure(&self) -> Option<&StubFailure> {
        match self {
            Response::Success(..) => None,
            Response::Failure(error) => Some(error),
        }
    }
}

/// How the body of a successful response is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Download {
    /// Empty body.
    #[default]
    NoContent,
    /// The whole body in one piece.
    Content(Bytes),
    /// The body split into chunks of `chunk_size` bytes.
    ///
    /// The final chunk may be shorter. A chunk size of zero is treated as one.
    StreamContent { data: Bytes, chunk_size: usize },
}

impl Download {
    /// In-memory body.
    pub fn content(data: impl Into<Bytes>) -> Self {
        Download::Content(data.into())
    }

    /// Body delivered in chunks of `chunk_size` bytes.
    pub fn stream_content(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Download::StreamContent {
            data: data.into(),
            chunk_size,
        }
    }

    /// All body bytes, regardless of delivery.
    pub fn data(&self) -> Bytes {
        match self {
            Download::NoContent => Bytes::new(),
            Download::Content(data) | Download::StreamContent { data, .. } => data.clone(),
        }
    }

    /// Splits the body into the chunks it is delivered as.
    ///
    /// `NoContent` yields nothing; `Content` yields a single chunk unless empty.
    pub fn chunks(&self) -> Vec<Bytes> {
        match self {
            Download::NoContent => Vec::new(),
            Download::Content(data) if data.is_empty() => Vec::new(),
            Download::Content(data) => vec![data.clone()],
            Download::StreamContent { data, chunk_size } => {
                let size = (*chunk_size).max(1);
                (0..data.len())
                    .step_by(size)
                    .map(|start| data.slice(start..(start + size).min(data.len())))
                    .collect()
            }
        }
    }
}

/// Head of a canned HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
}

impl HttpResponse {
    /// Create a response head for the request at `url`.
    pub fn new(url: impl Into<String>, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
        }
    }

    /// URL of the request this response answers.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Lowercased `type/subtype` from `Content-Type`.
    pub fn mime_type(&self) -> Option<String> {
        let content_type = self.header(CONTENT_TYPE.as_str())?;
        let essence = content_type.split(';').next()?.trim();
        if essence.is_empty() {
            return None;
        }
        Some(essence.to_ascii_lowercase())
    }

    /// Lowercased `charset` parameter from `Content-Type`.
    pub fn text_encoding_name(&self) -> Option<String> {
        let content_type = self.header(CONTENT_TYPE.as_str())?;
        content_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_ascii_lowercase())
        })
    }
}

/// The error a failing stub reports instead of a response.
///
/// It carries no taxonomy of its own: a domain, a code and an optional
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{domain} error {code}{}", message_suffix(.message))]
pub struct StubFailure {
    pub domain: String,
    pub code: i64,
    pub message: Option<String>,
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl StubFailure {
    pub const DEFAULT_DOMAIN: &'static str = "mockingjay";

    pub fn new(domain: impl Into<String>, code: i64) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The error used when a failure is requested without specifics.
    pub fn unspecified() -> Self {
        Self::new(Self::DEFAULT_DOMAIN, 0).with_message("unspecified failure")
    }
}
