//! Stub HTTP server.
//!
//! Provides an axum-based HTTP server that answers requests from a stub
//! registry.

use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::handlers;
use crate::error::Result;
use crate::stubs::Stubs;

/// A local HTTP server answering from a [`Stubs`] registry.
///
/// The server runs in the background until [`shutdown`](Self::shutdown) is
/// called or it is dropped.
#[derive(Debug)]
pub struct StubServer {
    /// The URL where the server is listening.
    url: String,
    address: SocketAddr,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Registry shared with the running server; changes apply immediately.
    stubs: Stubs,
}

impl StubServer {
    /// Start a server on a random available local port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(stubs: Stubs) -> Result<Self> {
        Self::start_on(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)), stubs).await
    }

    /// Start a server on `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` cannot be bound.
    pub async fn start_on(address: SocketAddr, stubs: Stubs) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Self::from_listener(listener, stubs).await
    }

    /// Serve on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn from_listener(listener: TcpListener, stubs: Stubs) -> Result<Self> {
        let address = listener.local_addr()?;
        let app = Self::create_router(stubs.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "stub server stopped");
            }
        });

        tracing::info!(%address, "stub server listening");

        Ok(Self {
            url: format!("http://{address}"),
            address,
            handle,
            stubs,
        })
    }

    /// Base URL of the server, without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute URL for `path` on this server.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// The registry the server answers from.
    pub fn stubs(&self) -> &Stubs {
        &self.stubs
    }

    /// A `reqwest` client that sends plain-HTTP requests through this
    /// server, whatever host they name.
    ///
    /// HTTPS requests are tunnelled by `reqwest` and cannot be stubbed this
    /// way; address the server directly for those.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(self.url.as_str())?)
            .build()?;
        Ok(client)
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }

    fn create_router(stubs: Stubs) -> Router {
        Router::new().fallback(handlers::answer).with_state(stubs)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
