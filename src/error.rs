//! Error types for stubbing operations.

use thiserror::Error;

/// Errors that can occur while registering, loading or serving stubs.
///
/// This is distinct from [`StubFailure`](crate::StubFailure), which is the
/// canned error a stub hands back in place of a response.
#[derive(Debug, Error)]
pub enum MockingjayError {
    /// No registered stub matched an intercepted request.
    #[error("No stub matches {method} {uri}")]
    Unmatched { method: String, uri: String },

    /// A stub definition could not be turned into a stub.
    #[error("Invalid stub #{index}: {reason}")]
    InvalidStub { index: usize, reason: String },

    /// A URI template failed to compile.
    #[error("Invalid URI template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A request could not be assembled.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// Reading a stub file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error.
    #[cfg(feature = "server")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Result type alias for mockingjay operations.
pub type Result<T> = core::result::Result<T, MockingjayError>;
