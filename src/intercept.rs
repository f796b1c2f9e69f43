//! Interception layer.
//!
//! [`StubService`] sits in front of any `tower` HTTP service. Requests that
//! match a registered stub are answered from the stub without reaching the
//! wrapped service; everything else is forwarded untouched.
//!
//! # Example
//!
//! ```
//! use mockingjay::{builders, matchers, StubService, Stubs};
//! use tower::ServiceExt;
//!
//! # async fn example() -> Result<(), mockingjay::BoxError> {
//! let stubs = Stubs::new();
//! stubs.stub(matchers::everything(), builders::json(&["A"]));
//!
//! let response = StubService::offline(stubs)
//!     .oneshot(http::Request::get("http://test.com/").body(())?)
//!     .await?;
//! assert_eq!(response.status(), 200);
//! # Ok(())
//! # }
//! ```

use std::future::{ready, Ready};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body::{Body, Frame};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use tower::{Layer, Service};

use crate::error::MockingjayError;
use crate::response::{Download, HttpResponse, Request, Response};
use crate::stubs::Stubs;

/// Type-erased error, as used throughout the `tower` ecosystem.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of responses leaving a [`StubService`].
pub type StubBody = UnsyncBoxBody<Bytes, BoxError>;

/// Copy the head of `request` into the view builders and matchers see.
pub fn request_view<B>(request: &http::Request<B>) -> Request {
    let mut view = Request::new(());
    *view.method_mut() = request.method().clone();
    *view.uri_mut() = request.uri().clone();
    *view.version_mut() = request.version();
    *view.headers_mut() = request.headers().clone();
    view
}

/// Turn a canned response head and body description into an HTTP response.
///
/// `StreamContent` bodies yield one data frame per chunk.
pub fn into_http_response(head: HttpResponse, download: Download) -> http::Response<StubBody> {
    let body = match &download {
        Download::StreamContent { .. } => {
            let frames = download
                .chunks()
                .into_iter()
                .map(|chunk| Ok::<_, BoxError>(Frame::data(chunk)));
            StreamBody::new(futures_util::stream::iter(frames)).boxed_unsync()
        }
        _ => Full::new(download.data())
            .map_err(|never| -> BoxError { match never {} })
            .boxed_unsync(),
    };

    let mut response = http::Response::new(body);
    *response.status_mut() = head.status();
    *response.headers_mut() = head.headers().clone();
    response
}

/// [`Layer`] that wraps services in a [`StubService`].
#[derive(Debug, Clone)]
pub struct StubLayer {
    stubs: Stubs,
}

impl StubLayer {
    pub fn new(stubs: Stubs) -> Self {
        Self { stubs }
    }
}

impl<S> Layer<S> for StubLayer {
    type Service = StubService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StubService::new(inner, self.stubs.clone())
    }
}

/// Answers stubbed requests and forwards the rest to `S`.
///
/// A stub's [`Response::Failure`] surfaces as the service error, boxed;
/// downcast it to [`StubFailure`](crate::StubFailure) to inspect it.
#[derive(Debug, Clone)]
pub struct StubService<S> {
    inner: S,
    stubs: Stubs,
}

impl<S> StubService<S> {
    pub fn new(inner: S, stubs: Stubs) -> Self {
        Self { inner, stubs }
    }

    pub fn stubs(&self) -> &Stubs {
        &self.stubs
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl StubService<Offline> {
    /// A service that never reaches the network: unmatched requests fail
    /// with [`MockingjayError::Unmatched`].
    pub fn offline(stubs: Stubs) -> Self {
        Self::new(Offline, stubs)
    }
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for StubService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>> + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ResBody: Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
    ReqBody: 'static,
{
    type Response = http::Response<StubBody>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: http::Request<ReqBody>) -> Self::Future {
        let view = request_view(&request);

        let Some(stub) = self.stubs.find(&view) else {
            tracing::trace!(method = %view.method(), uri = %view.uri(), "no stub, forwarding");
            let future = self.inner.call(request);
            return Box::pin(async move {
                let response = future.await.map_err(Into::<BoxError>::into)?;
                Ok::<_, BoxError>(
                    response.map(|body| body.map_err(Into::<BoxError>::into).boxed_unsync()),
                )
            });
        };

        tracing::debug!(
            id = %stub.id(),
            matcher = stub.description(),
            method = %view.method(),
            uri = %view.uri(),
            "stubbing request"
        );
        stubbed(stub.respond(&view), stub.delay())
    }
}

fn stubbed(
    response: Response,
    delay: Option<Duration>,
) -> BoxFuture<'static, Result<http::Response<StubBody>, BoxError>> {
    Box::pin(async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match response {
            Response::Success(head, download) => Ok(into_http_response(head, download)),
            Response::Failure(error) => Err(Box::new(error) as BoxError),
        }
    })
}

/// Inner service that rejects every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl<B> Service<http::Request<B>> for Offline {
    type Response = http::Response<Empty<Bytes>>;
    type Error = MockingjayError;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        tracing::warn!(method = %request.method(), uri = %request.uri(), "unmatched request");
        ready(Err(MockingjayError::Unmatched {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
        }))
    }
}
