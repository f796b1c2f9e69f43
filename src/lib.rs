//! Stub outgoing HTTP requests with canned responses.
//!
//! mockingjay lets application and library code be tested without real
//! network access. Outgoing requests are intercepted at the `tower`
//! service layer (or by a local [`StubServer`]) and answered with
//! programmer-supplied canned responses.
//!
//! # Quick Start
//!
//! ```
//! use mockingjay::{builders, matchers, Request, Stubs};
//!
//! let stubs = Stubs::new();
//! stubs.stub(
//!     matchers::http(http::Method::GET, "/users/{id}").unwrap(),
//!     builders::json(&serde_json::json!({ "name": "kyle" })),
//! );
//!
//! let request = Request::get("https://api.example.com/users/1").body(()).unwrap();
//! let response = stubs.respond(&request).unwrap();
//! let head = response.http_response().unwrap();
//! assert_eq!(head.status_code(), 200);
//! assert_eq!(head.mime_type().as_deref(), Some("application/json"));
//! ```
//!
//! # Architecture
//!
//! - [`builders`] - pure functions producing a [`Response`] from a request
//! - [`matchers`] - predicates deciding which stub applies
//! - [`Stubs`] - shared registry; the most recent matching stub wins
//! - [`StubService`] / [`StubLayer`] - `tower` interception
//! - [`StubServer`] - axum server answering from a registry (feature `server`)
//! - [`StubFile`] - declarative stubs in JSON

pub mod builders;
pub mod cli;
pub mod matchers;
pub mod output;
#[cfg(feature = "server")]
pub mod server;

mod error;
mod intercept;
mod response;
mod stub_file;
mod stubs;
mod template;

// Re-export core types
pub use builders::Builder;
pub use error::{MockingjayError, Result};
pub use intercept::{
    into_http_response, request_view, BoxError, Offline, StubBody, StubLayer, StubService,
};
pub use matchers::Matcher;
pub use response::{Download, HttpResponse, Request, Response, StubFailure};
pub use stub_file::{ResponseDefinition, StubDefinition, StubFile};
pub use stubs::{Stub, StubId, Stubs};
pub use template::UriTemplate;

#[cfg(feature = "server")]
pub use server::StubServer;
