//! Tree Builder
//!
//! Recursive descent over the input. Each call of [`TreeBuilder::parse_tag`]
//! owns the tag it is building; children are registered first and the
//! parent collects their ids, so the registry ends up in completion order
//! (post-order for well-formed input).
//!
//! Body handling, in priority order:
//! - `/>`: self-closing, empty body
//! - void element in an HTML document: no end tag, empty body
//! - `script`: raw text up to `</script>`, never parsed for tags
//! - anything else: body scan until the matching end tag

use super::namespace::NamespaceTable;
use super::tag::{Tag, TagId};
use crate::core::attributes::{parse_attributes, AttributeSink};
use crate::core::scanner::Scanner;
use crate::error::{ParseError, ParseResult};
use crate::index::Offset;

/// Elements that never take a body in HTML documents
pub const VOID_ELEMENTS: [&str; 6] = ["meta", "link", "img", "input", "br", "hr"];

/// Maximum depth of nested tags before parsing gives up
pub const MAX_NESTING_DEPTH: usize = 256;

/// Check if `name` is an HTML void element
#[inline]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Builder state shared by every level of the descent
pub(crate) struct TreeBuilder<'a> {
    pub(crate) scanner: Scanner<'a>,
    pub(crate) html: bool,
    pub(crate) tags: Vec<Tag<'a>>,
    pub(crate) namespaces: NamespaceTable<'a>,
}

/// Attribute destination for the tag under construction.
///
/// Namespace declarations are held back until the whole start tag has
/// parsed, so a `<` that degrades to text leaves the table untouched.
struct Frame<'t, 'a> {
    tag: &'t mut Tag<'a>,
    declarations: Vec<(&'a str, &'a str)>,
}

impl<'a> AttributeSink<'a> for Frame<'_, 'a> {
    #[inline]
    fn attribute(&mut self, name: &'a str, value: &'a str) {
        self.tag.attributes.insert(name, value);
    }

    #[inline]
    fn namespace(&mut self, prefix: &'a str, value: &'a str) {
        self.declarations.push((prefix, value));
    }
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        // Rough guess: one tag per 40 bytes of markup
        let estimated_tags = (source.len() / 40).max(8);

        TreeBuilder {
            scanner: Scanner::new(source),
            html: false,
            tags: Vec::with_capacity(estimated_tags),
            namespaces: NamespaceTable::new(),
        }
    }

    /// Parse one complete tag, with its subtree, at or after `pos`.
    ///
    /// On success the tag is registered and its id is returned together with
    /// the position just past its end. Descendants registered before a
    /// failure stay registered.
    pub(crate) fn parse_tag(&mut self, pos: usize, depth: usize) -> ParseResult<(TagId, usize)> {
        let start = self.scanner.skip_whitespace(pos);

        match self.scanner.peek(start) {
            Some(b'<') => {}
            Some(_) => return Err(ParseError::ExpectedTagOpen { position: start }),
            None => return Err(ParseError::UnexpectedEof { position: start }),
        }

        let (mut tag, cursor) = self.parse_start_tag(start + 1, start)?;

        let end = if self.scanner.starts_with(cursor, b"/>") {
            tag.body = Offset::empty_at(cursor + 2);
            cursor + 2
        } else if self.html && is_void_element(tag.name) {
            let close = self.scanner.skip_whitespace(cursor);
            if self.scanner.peek(close) != Some(b'>') {
                return Err(ParseError::UnclosedStartTag { position: close });
            }
            tag.body = Offset::empty_at(close + 1);
            close + 1
        } else if self.scanner.peek(cursor) == Some(b'>') {
            if tag.name == "script" {
                self.parse_script_body(&mut tag, cursor + 1)?
            } else {
                // Only descending into a body can grow the stack
                if depth >= MAX_NESTING_DEPTH {
                    return Err(ParseError::NestingTooDeep {
                        limit: MAX_NESTING_DEPTH,
                        position: start,
                    });
                }
                self.parse_body(&mut tag, cursor + 1, depth)?
            }
        } else {
            return Err(ParseError::UnclosedStartTag { position: cursor });
        };

        tag.span = Offset::new(start, end);
        let id = self.register(tag);

        Ok((id, self.scanner.record(end)))
    }

    /// Parse a tag name and its attributes.
    ///
    /// `name_pos` is just after the `<` (or `<?`/`<!`), `start` is the `<`.
    /// Returns the tag and the position of its terminator.
    pub(crate) fn parse_start_tag(
        &mut self,
        name_pos: usize,
        start: usize,
    ) -> ParseResult<(Tag<'a>, usize)> {
        let name_end = self.scanner.read_token(name_pos)?;
        let mut name = self.scanner.token_text(name_pos, name_end);
        let mut namespace = None;
        let mut cursor = name_end;

        if self.scanner.peek(cursor) == Some(b':') && !self.scanner.is_quote(name_pos) {
            let local_end = self.scanner.read_name(cursor + 1)?;
            namespace = Some(name);
            name = self.scanner.text(cursor + 1, local_end);
            cursor = local_end;
        }

        let mut tag = Tag::new(name, namespace, start);

        // Attributes need at least one whitespace after the name
        let after_ws = self.scanner.skip_whitespace(cursor);
        if after_ws != cursor {
            let mut frame = Frame {
                tag: &mut tag,
                declarations: Vec::new(),
            };
            cursor = parse_attributes(&mut self.scanner, after_ws, self.html, &mut frame)?;
            for (prefix, value) in frame.declarations {
                self.namespaces.declare(prefix, value);
            }
        }

        Ok((tag, self.scanner.record(cursor)))
    }

    /// Scan the content after a start tag's `>` up to the matching end tag.
    ///
    /// A `<` that does not open a well-formed tag is taken as text and the
    /// scan resumes one byte further. Unterminated constructs below abort
    /// this tag as well.
    fn parse_body(&mut self, tag: &mut Tag<'a>, body_start: usize, depth: usize) -> ParseResult {
        let mut pos = body_start;

        loop {
            let Some(lt) = self.scanner.find_tag_start(pos) else {
                return Err(ParseError::UnterminatedBody {
                    name: tag.qualified_name(),
                    position: body_start,
                });
            };

            if self.scanner.starts_with(lt, b"<!--") {
                pos = self.skip_comment(lt);
                continue;
            }

            if let Some(end) = self.match_end_tag(lt, tag) {
                tag.body = Offset::new(body_start, lt);
                return Ok(self.scanner.record(end));
            }

            match self.parse_tag(lt, depth + 1) {
                Ok((child, next)) => {
                    tag.children.push(child);
                    pos = next;
                }
                Err(err) if err.is_recoverable() => pos = lt + 1,
                Err(err) => return Err(err),
            }
        }
    }

    /// Scan a raw `script` body up to `</script`, optional whitespace and `>`
    fn parse_script_body(&mut self, tag: &mut Tag<'a>, body_start: usize) -> ParseResult {
        let mut pos = body_start;

        while let Some(close) = self.scanner.find(pos, b"</script") {
            let after = self.scanner.skip_whitespace(close + b"</script".len());
            if self.scanner.peek(after) == Some(b'>') {
                tag.body = Offset::new(body_start, close);
                return Ok(self.scanner.record(after + 1));
            }
            pos = close + 1;
        }

        Err(ParseError::UnterminatedScript {
            position: body_start,
        })
    }

    /// `</name>` at `pos`, compared on the name as written in the start tag.
    /// Returns the position past the `>`.
    fn match_end_tag(&self, pos: usize, tag: &Tag<'a>) -> Option<usize> {
        if !self.scanner.starts_with(pos, b"</") {
            return None;
        }

        let mut cursor = pos + 2;

        if let Some(prefix) = tag.namespace {
            if !self.scanner.starts_with(cursor, prefix.as_bytes())
                || self.scanner.peek(cursor + prefix.len()) != Some(b':')
            {
                return None;
            }
            cursor += prefix.len() + 1;
        }

        if !self.scanner.starts_with(cursor, tag.name.as_bytes()) {
            return None;
        }
        cursor += tag.name.len();

        (self.scanner.peek(cursor) == Some(b'>')).then_some(cursor + 1)
    }

    /// Skip a `<!-- -->` comment starting at `pos`. An unterminated comment
    /// runs to the end of the input.
    pub(crate) fn skip_comment(&mut self, pos: usize) -> usize {
        let end = match self.scanner.find(pos + 4, b"-->") {
            Some(close) => close + 3,
            None => self.scanner.len(),
        };
        self.scanner.record(end)
    }

    fn register(&mut self, tag: Tag<'a>) -> TagId {
        let id = TagId(self.tags.len() as u32);
        self.tags.push(tag);
        id
    }
}
