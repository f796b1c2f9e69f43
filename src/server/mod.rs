//! Stub server for clients that cannot be wrapped in-process.
//!
//! [`StubServer`] listens on a local port and answers every request from a
//! [`Stubs`](crate::Stubs) registry. Point a client's base URL at
//! [`StubServer::url`], or use [`StubServer::client`] to get a `reqwest`
//! client that routes all plain-HTTP traffic through the server, so that
//! requests for `http://api.example.com/...` are stubbed unchanged.
//!
//! # Example
//!
//! ```no_run
//! use mockingjay::{builders, matchers, StubServer, Stubs};
//!
//! # async fn example() -> mockingjay::Result<()> {
//! let stubs = Stubs::new();
//! stubs.stub(matchers::uri("/users/{id}")?, builders::json(&serde_json::json!({"id": 1})));
//!
//! let server = StubServer::start(stubs).await?;
//! let body = server
//!     .client()?
//!     .get("http://api.example.com/users/1")
//!     .send()
//!     .await?
//!     .text()
//!     .await?;
//! assert_eq!(body, r#"{"id":1}"#);
//!
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod handlers;
mod server;

pub use handlers::FAILURE_HEADER;
pub use server::StubServer;
