//! Stub registry.
//!
//! A [`Stubs`] registry pairs matchers with builders. The interception
//! layer asks it for the first stub that matches an outgoing request; the
//! most recently registered stubs are consulted first, so a test can
//! override a broad stub with a narrower one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::builders::Builder;
use crate::matchers::Matcher;
use crate::response::{Request, Response};

static NEXT_STUB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique identifier of a stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubId(u64);

impl StubId {
    fn next() -> Self {
        Self(NEXT_STUB_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A matcher paired with the builder that answers matching requests.
#[derive(Debug, Clone)]
pub struct Stub {
    id: StubId,
    matcher: Matcher,
    builder: Builder,
    delay: Option<Duration>,
}

impl Stub {
    pub fn new(matcher: Matcher, builder: Builder) -> Self {
        Self {
            id: StubId::next(),
            matcher,
            builder,
            delay: None,
        }
    }

    /// Delay the answer by `delay` once the stub is selected.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn id(&self) -> StubId {
        self.id
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn description(&self) -> &str {
        self.matcher.description()
    }

    pub fn matches(&self, request: &Request) -> bool {
        self.matcher.matches(request)
    }

    pub fn respond(&self, request: &Request) -> Response {
        self.builder.respond(request)
    }
}

/// Shared registry of stubs.
///
/// This struct is cheaply cloneable; clones share the same stubs, so a
/// registry handed to a [`StubService`](crate::StubService) can still be
/// changed from the test that owns it.
#[derive(Debug, Clone, Default)]
pub struct Stubs {
    inner: Arc<RwLock<Vec<Stub>>>,
}

impl Stubs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `builder` for requests accepted by `matcher`.
    pub fn stub(&self, matcher: Matcher, builder: Builder) -> Stub {
        self.add(Stub::new(matcher, builder))
    }

    /// Register a stub whose answer is delayed by `delay`.
    pub fn stub_with_delay(&self, matcher: Matcher, builder: Builder, delay: Duration) -> Stub {
        self.add(Stub::new(matcher, builder).with_delay(delay))
    }

    /// Register a prepared stub. It takes precedence over all earlier ones.
    pub fn add(&self, stub: Stub) -> Stub {
        tracing::debug!(id = %stub.id(), matcher = stub.description(), "registered stub");
        self.write().push(stub.clone());
        stub
    }

    /// Remove `stub`. Returns `false` if it was not registered.
    pub fn remove(&self, stub: &Stub) -> bool {
        let mut stubs = self.write();
        let before = stubs.len();
        stubs.retain(|s| s.id() != stub.id());
        let removed = stubs.len() != before;
        if removed {
            tracing::debug!(id = %stub.id(), "removed stub");
        }
        removed
    }

    pub fn remove_all(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered stubs in the order they are consulted.
    pub fn list(&self) -> Vec<Stub> {
        self.read().iter().rev().cloned().collect()
    }

    /// The stub that answers `request`, if any.
    ///
    /// Matchers run on a snapshot taken outside the lock, so they may
    /// change the registry themselves.
    pub fn find(&self, request: &Request) -> Option<Stub> {
        let snapshot = self.read().clone();
        snapshot.into_iter().rev().find(|stub| stub.matches(request))
    }

    /// Run the matching stub's builder for `request`.
    pub fn respond(&self, request: &Request) -> Option<Response> {
        self.find(request).map(|stub| stub.respond(request))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Stub>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Stub>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
