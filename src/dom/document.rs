//! Document - parse driver and query API
//!
//! A [`Document`] is built in one synchronous pass by [`Document::parse`]
//! and is read-only afterwards:
//! - an optional prolog (`<?xml ...?>` or `<!DOCTYPE ...>`) is recognised
//!   first; a DOCTYPE with a bare `html` attribute switches to HTML mode
//! - top-level tags are parsed until the input is exhausted or a tag fails
//! - every completed tag lands in a flat registry in completion order and
//!   the top-level ones hang off a synthetic root

use super::builder::TreeBuilder;
use super::namespace::NamespaceTable;
use super::tag::{Tag, TagId, TagRef};
use crate::error::{ParseError, ParseResult};

/// A parsed markup document borrowing its source text
pub struct Document<'a> {
    source: &'a str,
    /// All completed tags, in completion order
    tags: Vec<Tag<'a>>,
    /// Synthetic parent of the top-level tags
    root: Tag<'a>,
    prolog: Option<Tag<'a>>,
    namespaces: NamespaceTable<'a>,
    html: bool,
    error: Option<ParseError>,
    last_position: usize,
}

impl<'a> Document<'a> {
    /// Parse a document.
    ///
    /// Parsing never fails as a whole: a malformed document yields whatever
    /// was completed before the failure, with [`Document::success`] unset.
    pub fn parse(source: &'a str) -> Self {
        let mut builder = TreeBuilder::new(source);
        let mut root = Tag::root(source.len());

        let (prolog, start) = match parse_prolog(&mut builder) {
            Ok((tag, next)) => (Some(tag), next),
            Err(_) => (None, 0),
        };

        let error = parse_top_level(&mut builder, start, &mut root.children).err();

        let doc = Document {
            source,
            last_position: builder.scanner.last_position(),
            tags: builder.tags,
            root,
            prolog,
            namespaces: builder.namespaces,
            html: builder.html,
            error,
        };

        match &doc.error {
            None => tracing::debug!(
                "Parsed {} tags ({} bytes, html: {})",
                doc.tags.len(),
                source.len(),
                doc.html
            ),
            Some(err) => tracing::debug!(
                "Parse stopped after {} tags: {} (reached byte {})",
                doc.tags.len(),
                err,
                doc.last_position
            ),
        }

        doc
    }

    /// The source text
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Whether the top-level loop consumed the whole input
    #[inline]
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// The failure that stopped the top-level loop
    #[inline]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Furthest byte position any parsing attempt reached
    #[inline]
    pub fn last_position(&self) -> usize {
        self.last_position
    }

    /// Whether a `<!DOCTYPE html>` prolog was recognised
    #[inline]
    pub fn is_html(&self) -> bool {
        self.html
    }

    /// The `<?...?>` or `<!...>` declaration preceding the top-level tags.
    /// It is neither registered nor attached to the root.
    #[inline]
    pub fn prolog(&self) -> Option<&Tag<'a>> {
        self.prolog.as_ref()
    }

    #[inline]
    pub fn namespaces(&self) -> &NamespaceTable<'a> {
        &self.namespaces
    }

    /// Synthetic tag whose children are the top-level tags
    #[inline]
    pub fn root(&self) -> TagRef<'_, 'a> {
        TagRef::new(self, &self.root)
    }

    /// Get a tag by id
    #[inline]
    pub fn get(&self, id: TagId) -> Option<TagRef<'_, 'a>> {
        self.tags.get(id.index()).map(|tag| TagRef::new(self, tag))
    }

    /// Number of registered tags
    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All registered tags in completion order
    pub fn tags(&self) -> impl Iterator<Item = TagRef<'_, 'a>> + '_ {
        self.tags.iter().map(move |tag| TagRef::new(self, tag))
    }

    /// Earliest-completing tag named `name`
    pub fn first(&self, name: &str) -> Option<TagRef<'_, 'a>> {
        self.tags().find(|tag| tag.name() == name)
    }

    /// Every tag named `name`, in completion order
    pub fn filter(&self, name: &str) -> Vec<TagRef<'_, 'a>> {
        self.tags().filter(|tag| tag.name() == name).collect()
    }
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.source.len())
            .field("tags", &self.tags.len())
            .field("html", &self.html)
            .field("error", &self.error)
            .finish()
    }
}

/// Recognise a leading `<?...?>` or `<!...>` declaration.
///
/// Returns the declaration and the position after it.
fn parse_prolog<'a>(builder: &mut TreeBuilder<'a>) -> ParseResult<(Tag<'a>, usize)> {
    let start = builder.scanner.skip_whitespace(0);

    if builder.scanner.peek(start) != Some(b'<') {
        return Err(ParseError::ExpectedTagOpen { position: start });
    }

    match builder.scanner.expect_byte(start + 1)? {
        b'?' => {
            let (tag, cursor) = builder.parse_start_tag(start + 2, start)?;
            if !builder.scanner.starts_with(cursor, b"?>") {
                return Err(ParseError::UnclosedStartTag { position: cursor });
            }
            Ok((tag, builder.scanner.record(cursor + 2)))
        }
        b'!' => {
            let (tag, cursor) = builder.parse_start_tag(start + 2, start)?;
            if builder.scanner.peek(cursor) != Some(b'>') {
                return Err(ParseError::UnclosedStartTag { position: cursor });
            }
            builder.html =
                tag.name().eq_ignore_ascii_case("doctype") && tag.attribute("html") == Some("html");
            Ok((tag, builder.scanner.record(cursor + 1)))
        }
        _ => Err(ParseError::InvalidNameStart {
            position: start + 1,
        }),
    }
}

/// Parse top-level tags until the input is exhausted or a tag fails.
///
/// Whitespace and comments between top-level tags are skipped.
fn parse_top_level(
    builder: &mut TreeBuilder<'_>,
    mut pos: usize,
    children: &mut Vec<TagId>,
) -> ParseResult<()> {
    loop {
        pos = builder.scanner.skip_whitespace(pos);

        if pos >= builder.scanner.len() {
            return Ok(());
        }

        if builder.scanner.starts_with(pos, b"<!--") {
            pos = builder.skip_comment(pos);
            continue;
        }

        let (id, next) = builder.parse_tag(pos, 0)?;
        children.push(id);
        pos = next;
    }
}
