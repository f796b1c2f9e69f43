//! Request matchers.
//!
//! A [`Matcher`] decides whether a stub applies to an outgoing request.

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::error::Result;
use crate::response::Request;
use crate::template::UriTemplate;

/// A described predicate over requests.
#[derive(Clone)]
pub struct Matcher {
    description: String,
    predicate: Arc<dyn Fn(&Request) -> bool + Send + Sync>,
}

impl Matcher {
    /// Build a matcher from a predicate and a human-readable description.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, request: &Request) -> bool {
        (self.predicate)(request)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Match every request.
pub fn everything() -> Matcher {
    Matcher::new("*", |_| true)
}

/// Match requests whose URL matches the URI `template`.
///
/// The template is tried against the absolute URL first, then against the
/// path alone, so both `https://api.github.com/users/{user}` and
/// `/users/{user}` match a request for `https://api.github.com/users/kylef`.
///
/// # Errors
///
/// Returns an error if `template` is not a valid URI template.
pub fn uri(template: &str) -> Result<Matcher> {
    let template = UriTemplate::new(template)?;
    let description = template.as_str().to_string();

    Ok(Matcher::new(description, move |request| {
        let uri = request.uri();
        template.matches(&uri.to_string()) || template.matches(uri.path())
    }))
}

/// Match requests with `method` whose URL matches `template`.
///
/// # Errors
///
/// Returns an error if `template` is not a valid URI template.
pub fn http(method: Method, template: &str) -> Result<Matcher> {
    let by_uri = uri(template)?;
    let description = format!("{method} {}", by_uri.description());

    Ok(Matcher::new(description, move |request| {
        *request.method() == method && by_uri.matches(request)
    }))
}
