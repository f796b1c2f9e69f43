//! Declarative stub files.
//!
//! A stub file is a JSON document listing stubs, used by the `mockingjay`
//! binary and by fixture-driven tests:
//!
//! ```json
//! {
//!   "stubs": [
//!     { "method": "GET", "uri": "/users/{id}",
//!       "response": { "type": "json", "body": { "name": "kyle" } } },
//!     { "uri": "/legacy",
//!       "response": { "type": "redirect", "location": "/users/1" } },
//!     { "response": { "type": "failure", "code": -1009 } }
//!   ]
//! }
//! ```
//!
//! Entries are consulted in file order: the first entry that matches a
//! request answers it.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use encoding_rs::Encoding;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::builders::{self, Builder};
use crate::error::{MockingjayError, Result};
use crate::matchers::{self, Matcher};
use crate::response::{Download, StubFailure};
use crate::stubs::{Stub, Stubs};

/// Parsed contents of a stub file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubFile {
    #[serde(default)]
    pub stubs: Vec<StubDefinition>,
}

/// One stub: what to match and how to answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubDefinition {
    /// HTTP method to match. Any method when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// URI template to match. Any URL when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Milliseconds to wait before answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    pub response: ResponseDefinition,
}

/// The canned answer of a stub definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ResponseDefinition {
    /// Arbitrary status, headers and raw body.
    Http {
        #[serde(default = "default_status")]
        status: u16,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        body: Option<String>,
        /// Deliver the body in chunks of this many bytes.
        #[serde(default)]
        chunk_size: Option<usize>,
    },
    Json {
        #[serde(default = "default_status")]
        status: u16,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        body: serde_json::Value,
    },
    Text {
        #[serde(default = "default_status")]
        status: u16,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        body: String,
        /// WHATWG encoding label, e.g. `utf-8` or `latin1`.
        #[serde(default = "default_encoding")]
        encoding: String,
    },
    Redirect {
        location: String,
        #[serde(default = "default_redirect_status")]
        status: u16,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    Failure {
        #[serde(default = "default_failure_domain")]
        domain: String,
        #[serde(default)]
        code: i64,
        #[serde(default)]
        message: Option<String>,
    },
}

fn default_status() -> u16 {
    200
}

fn default_redirect_status() -> u16 {
    301
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_failure_domain() -> String {
    StubFailure::DEFAULT_DOMAIN.to_string()
}

impl StubFile {
    /// Read and parse a stub file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build every stub, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`MockingjayError::InvalidStub`] naming the first definition
    /// that cannot be built.
    pub fn to_stubs(&self) -> Result<Vec<Stub>> {
        self.stubs
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                definition
                    .to_stub()
                    .map_err(|reason| MockingjayError::InvalidStub { index, reason })
            })
            .collect()
    }

    /// Register all stubs with `stubs` so that earlier entries take
    /// precedence. Nothing is registered if any definition is invalid.
    pub fn register(&self, stubs: &Stubs) -> Result<Vec<Stub>> {
        let built = self.to_stubs()?;
        for stub in built.iter().rev() {
            stubs.add(stub.clone());
        }
        tracing::info!(count = built.len(), "registered stubs from file");
        Ok(built)
    }
}

impl StubDefinition {
    fn to_stub(&self) -> std::result::Result<Stub, String> {
        let stub = Stub::new(self.matcher()?, self.response.to_builder()?);
        Ok(match self.delay_ms {
            Some(ms) => stub.with_delay(Duration::from_millis(ms)),
            None => stub,
        })
    }

    fn matcher(&self) -> std::result::Result<Matcher, String> {
        let method = self
            .method
            .as_deref()
            .map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()))
            .transpose()
            .map_err(|_| {
                let method = self.method.as_deref().unwrap_or_default();
                format!("invalid method '{method}'")
            })?;

        let matcher = match (method, self.uri.as_deref()) {
            (Some(method), Some(uri)) => matchers::http(method, uri),
            (None, Some(uri)) => matchers::uri(uri),
            (Some(method), None) => Ok(Matcher::new(format!("{method} *"), move |request| {
                *request.method() == method
            })),
            (None, None) => Ok(matchers::everything()),
        };
        matcher.map_err(|e| e.to_string())
    }
}

impl ResponseDefinition {
    fn to_builder(&self) -> std::result::Result<Builder, String> {
        match self {
            ResponseDefinition::Http {
                status,
                headers,
                body,
                chunk_size,
            } => {
                let data = body.clone().map(Bytes::from).unwrap_or_default();
                let download = match (chunk_size, data.is_empty()) {
                    (Some(0), _) => return Err("chunk_size must be positive".to_string()),
                    (Some(size), _) => Download::stream_content(data, *size),
                    (None, true) => Download::NoContent,
                    (None, false) => Download::Content(data),
                };
                Ok(builders::http(parse_status(*status)?, parse_headers(headers)?, download))
            }
            ResponseDefinition::Json {
                status,
                headers,
                body,
            } => Ok(builders::json_with(body, parse_status(*status)?, parse_headers(headers)?)),
            ResponseDefinition::Text {
                status,
                headers,
                body,
                encoding,
            } => {
                let encoding = Encoding::for_label(encoding.as_bytes())
                    .ok_or_else(|| format!("unknown encoding '{encoding}'"))?;
                Ok(builders::text_with(
                    body,
                    encoding,
                    parse_status(*status)?,
                    parse_headers(headers)?,
                ))
            }
            ResponseDefinition::Redirect {
                location,
                status,
                headers,
            } => {
                HeaderValue::from_str(location)
                    .map_err(|_| format!("invalid redirect location '{location}'"))?;
                Ok(builders::redirect_with(
                    location,
                    parse_status(*status)?,
                    parse_headers(headers)?,
                ))
            }
            ResponseDefinition::Failure {
                domain,
                code,
                message,
            } => {
                let mut error = StubFailure::new(domain.clone(), *code);
                error.message = message.clone();
                Ok(builders::failure(error))
            }
        }
    }
}

fn parse_status(status: u16) -> std::result::Result<StatusCode, String> {
    StatusCode::from_u16(status).map_err(|_| format!("invalid status code {status}"))
}

fn parse_headers(headers: &BTreeMap<String, String>) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| format!("invalid header name '{name}'"))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| format!("invalid value for header '{name}'"))?;
        map.append(name, value);
    }
    Ok(map)
}
