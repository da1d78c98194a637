//! Live-reload injection
//!
//! Splices a small client script at the start of the first `<head>` body.
//! The script opens an `EventSource` on the events endpoint and reloads the
//! page on the first message it receives.

use crate::dom::Document;
use crate::error::ParseError;
use std::borrow::Cow;

/// Events endpoint the client fragment connects to by default
pub const DEFAULT_EVENTS_URL: &str = "http://localhost:8080/events";

/// Build the client fragment for an events endpoint
pub fn reload_fragment(events_url: &str) -> String {
    format!(
        "<script>\n\
         const eventSource = new EventSource('{events_url}');\n\
         eventSource.onmessage = (event) => {{\n\
         \teventSource.close();\n\
         \tlocation.reload(true);\n\
         }};\n\
         </script>"
    )
}

/// Inserts a fixed fragment into HTML documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injector {
    fragment: String,
}

impl Default for Injector {
    fn default() -> Self {
        Injector::new(DEFAULT_EVENTS_URL)
    }
}

impl Injector {
    /// Injector carrying the live-reload client for `events_url`
    pub fn new(events_url: &str) -> Self {
        Injector {
            fragment: reload_fragment(events_url),
        }
    }

    /// Injector carrying an arbitrary fragment
    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        Injector {
            fragment: fragment.into(),
        }
    }

    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Insert the fragment at the start of the first `head` body.
    ///
    /// A document without a `head` tag comes back borrowed and untouched.
    /// A document that fails to parse is an error; the caller decides what
    /// to keep instead.
    pub fn inject<'s>(&self, source: &'s str) -> Result<Cow<'s, str>, ParseError> {
        let doc = Document::parse(source);

        if let Some(err) = doc.error() {
            return Err(err.clone());
        }

        let Some(head) = doc.first("head") else {
            return Ok(Cow::Borrowed(source));
        };

        let at = head.body().start;
        let mut out = String::with_capacity(source.len() + self.fragment.len());
        out.push_str(&source[..at]);
        out.push_str(&self.fragment);
        out.push_str(&source[at..]);

        Ok(Cow::Owned(out))
    }
}
