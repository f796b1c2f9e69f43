//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output as an
//! alternative to JSON serialization, plus the row and summary types the
//! binary prints.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use crate::response::{Download, Response};
use crate::stubs::Stub;

const BODY_PREVIEW_CHARS: usize = 200;

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Response {
    fn pretty_print(&self) -> String {
        let (head, download) = match self {
            Response::Success(head, download) => (head, download),
            Response::Failure(error) => {
                let mut lines = vec![format!("Failure: {} ({})", error.domain, error.code)];
                if let Some(ref message) = error.message {
                    lines.push(format!("Message:        {message}"));
                }
                return lines.join("\n");
            }
        };

        let title = format!("Status: {}", head.status());
        let divider = "─".repeat(title.len().max(30));

        let mut lines = vec![title, divider, format!("URL:            {}", head.url())];

        if let Some(mime) = head.mime_type() {
            lines.push(format!("MIME Type:      {mime}"));
        }

        if let Some(encoding) = head.text_encoding_name() {
            lines.push(format!("Encoding:       {encoding}"));
        }

        for (name, value) in head.headers() {
            lines.push(format!(
                "Header:         {name}: {}",
                String::from_utf8_lossy(value.as_bytes())
            ));
        }

        lines.push(format!("Body:           {}", describe_download(download)));

        if let Some(preview) = body_preview(download) {
            lines.push(String::new());
            lines.push(preview);
        }

        lines.join("\n")
    }
}

fn describe_download(download: &Download) -> String {
    match download {
        Download::NoContent => "none".to_string(),
        Download::Content(data) => format!("{} bytes", data.len()),
        Download::StreamContent { data, chunk_size } => format!(
            "{} bytes in {} chunks of {}",
            data.len(),
            download.chunks().len(),
            chunk_size
        ),
    }
}

fn body_preview(download: &Download) -> Option<String> {
    let data = download.data();
    let text = std::str::from_utf8(&data).ok()?;
    if text.is_empty() {
        return None;
    }
    let mut preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
    if text.chars().count() > BODY_PREVIEW_CHARS {
        preview.push('…');
    }
    Some(preview)
}

/// One line of `mockingjay check`.
#[derive(Debug, Serialize, Tabled)]
pub struct StubRow {
    /// Position in the order stubs are consulted, from 1.
    #[tabled(rename = "#")]
    pub order: usize,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Matcher")]
    pub matcher: String,
    #[tabled(rename = "Delay")]
    pub delay: String,
}

impl StubRow {
    pub fn new(order: usize, stub: &Stub) -> Self {
        Self {
            order,
            id: stub.id().to_string(),
            matcher: stub.description().to_string(),
            delay: stub
                .delay()
                .map(|d| format!("{}ms", d.as_millis()))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// JSON summary printed by `mockingjay resolve --json`.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub stub: String,
    pub matcher: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Resolution {
    pub fn new(stub: &Stub, response: &Response) -> Self {
        let mut resolution = Self {
            stub: stub.id().to_string(),
            matcher: stub.description().to_string(),
            status: None,
            headers: BTreeMap::new(),
            body: None,
            chunks: None,
            failure: None,
        };

        match response {
            Response::Success(head, download) => {
                resolution.status = Some(head.status_code());
                resolution.headers = head
                    .headers()
                    .iter()
                    .map(|(name, value)| {
                        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                        (name.to_string(), value)
                    })
                    .collect();
                let data = download.data();
                if !data.is_empty() {
                    resolution.body = Some(String::from_utf8_lossy(&data).into_owned());
                }
                if let Download::StreamContent { .. } = download {
                    resolution.chunks = Some(download.chunks().len());
                }
            }
            Response::Failure(error) => resolution.failure = Some(error.to_string()),
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::builders::{self, failure, json, ok};
    use crate::matchers::everything;
    use crate::response::{Request, StubFailure};

    fn request() -> Request {
        Request::get("http://test.com/").body(()).unwrap()
    }

    #[test]
    fn test_pretty_print_json() {
        let output = json(&["A"]).respond(&request()).pretty_print();
        assert!(output.starts_with("Status: 200 OK"));
        assert!(output.contains("MIME Type:      application/json"));
        assert!(output.contains("Encoding:       utf-8"));
        assert!(output.contains("Body:           5 bytes"));
        assert!(output.contains(r#"["A"]"#));
    }

    #[test]
    fn test_pretty_print_stream() {
        let download = Download::stream_content(vec![b'x'; 10], 4);
        let output = builders::http(http::StatusCode::OK, http::HeaderMap::new(), download)
            .respond(&request())
            .pretty_print();
        assert!(output.contains("10 bytes in 3 chunks of 4"));
    }

    #[test]
    fn test_pretty_print_failure() {
        let error = StubFailure::new("network", -1009).with_message("offline");
        let output = failure(error).respond(&request()).pretty_print();
        assert_eq!(output, "Failure: network (-1009)\nMessage:        offline");
    }

    #[test]
    fn test_stub_row() {
        let stub = Stub::new(everything(), ok()).with_delay(Duration::from_millis(250));
        let row = StubRow::new(1, &stub);
        assert_eq!(row.matcher, "*");
        assert_eq!(row.delay, "250ms");
    }

    #[test]
    fn test_resolution_json() {
        let stub = Stub::new(everything(), json(&["A"]));
        let resolution = Resolution::new(&stub, &stub.respond(&request()));
        let value = serde_json::to_value(&resolution).unwrap();

        assert_eq!(value["status"], 200);
        assert_eq!(value["body"], r#"["A"]"#);
        assert_eq!(value["headers"]["content-type"], "application/json; charset=utf-8");
        assert!(value.get("failure").is_none());
    }
}
