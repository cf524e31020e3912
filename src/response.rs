//! Response plumbing: negotiated formats, headers, and the sink the
//! converters write into.

use std::io::Write;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// The negotiated output format of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Html,
    Pdf,
}

impl ResponseFormat {
    /// The content type written for this format.
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Html => "text/html",
            ResponseFormat::Pdf => "application/pdf",
        }
    }

    /// Map a negotiated content type to a format, ignoring parameters
    /// such as `charset`.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or(value).trim();
        if essence.eq_ignore_ascii_case("text/html") {
            Some(ResponseFormat::Html)
        } else if essence.eq_ignore_ascii_case("application/pdf") {
            Some(ResponseFormat::Pdf)
        } else {
            None
        }
    }
}

/// Response headers. Names compare case-insensitively; setting an
/// existing name replaces its value.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        for (n, v) in &mut self.entries {
            if n.eq_ignore_ascii_case(name) {
                *v = value;
                return;
            }
        }
        self.entries.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_content_type(&mut self, value: &str) {
        self.set(CONTENT_TYPE, value);
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a response lands: headers plus a byte stream. The HTTP layer of
/// an embedding application implements this over its own response type.
pub trait ResponseSink {
    fn headers_mut(&mut self) -> &mut Headers;
    fn body(&mut self) -> &mut dyn Write;
}

/// In-memory sink for tests and the command-line tool.
#[derive(Debug, Default)]
pub struct MemoryResponse {
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl MemoryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl ResponseSink for MemoryResponse {
    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html");
        headers.set("content-type", "application/pdf");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/pdf"));
    }

    #[test]
    fn format_parses_with_parameters() {
        assert_eq!(
            ResponseFormat::from_content_type("text/html; charset=utf-8"),
            Some(ResponseFormat::Html)
        );
        assert_eq!(
            ResponseFormat::from_content_type("APPLICATION/PDF"),
            Some(ResponseFormat::Pdf)
        );
        assert_eq!(ResponseFormat::from_content_type("image/png"), None);
    }

    #[test]
    fn iter_yields_headers_in_insertion_order() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/pdf");
        headers.set("Content-Disposition", "attachment");
        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(
            collected,
            [
                ("Content-Type", "application/pdf"),
                ("Content-Disposition", "attachment"),
            ]
        );
    }

    #[test]
    fn memory_response_collects_bytes() {
        let mut sink = MemoryResponse::new();
        sink.body().write_all(b"abc").unwrap();
        assert_eq!(sink.body_text(), "abc");
    }
}
