//! Position-based scanning primitives using memchr
//!
//! Every primitive takes an explicit position instead of moving an internal
//! cursor, so a failed attempt never needs to be rolled back. Successful
//! positions are funnelled through [`Scanner::record`], which keeps the
//! high-water mark: the furthest position any attempt reached, kept for
//! diagnostics even when the attempt later fails.

use crate::error::{ParseError, ParseResult};
use memchr::{memchr, memmem};

/// Scanner over an immutable input buffer
pub struct Scanner<'a> {
    source: &'a str,
    input: &'a [u8],
    mark: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            input: source.as_bytes(),
            mark: 0,
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Text between two positions.
    ///
    /// Positions handed out by the primitives always sit next to an ASCII
    /// delimiter, so they fall on character boundaries.
    #[inline]
    pub fn text(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    /// Text of a token read by [`Scanner::read_token`]; quoted tokens lose
    /// their quotes
    #[inline]
    pub fn token_text(&self, start: usize, end: usize) -> &'a str {
        if self.is_quote(start) {
            self.text(start + 1, end.saturating_sub(1))
        } else {
            self.text(start, end)
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Furthest position reached so far
    #[inline]
    pub fn last_position(&self) -> usize {
        self.mark
    }

    /// Raise the high-water mark to `pos` if it is further, and hand `pos` back
    #[inline]
    pub fn record(&mut self, pos: usize) -> usize {
        if pos > self.mark {
            self.mark = pos;
        }
        pos
    }

    /// Byte at `pos`, if in range
    #[inline]
    pub fn peek(&self, pos: usize) -> Option<u8> {
        self.input.get(pos).copied()
    }

    /// Byte at `pos`, or an end-of-input failure
    #[inline]
    pub fn expect_byte(&self, pos: usize) -> ParseResult<u8> {
        self.peek(pos)
            .ok_or(ParseError::UnexpectedEof { position: pos })
    }

    /// Check if the input continues with `needle` at `pos`
    #[inline]
    pub fn starts_with(&self, pos: usize, needle: &[u8]) -> bool {
        self.input
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(needle))
    }

    #[inline]
    pub fn is_whitespace(&self, pos: usize) -> bool {
        self.peek(pos).is_some_and(is_whitespace)
    }

    #[inline]
    pub fn is_alpha(&self, pos: usize) -> bool {
        self.peek(pos).is_some_and(|b| b.is_ascii_alphabetic())
    }

    #[inline]
    pub fn is_valid_tag_start(&self, pos: usize) -> bool {
        self.peek(pos).is_some_and(is_tag_start_char)
    }

    #[inline]
    pub fn is_valid_tag_char(&self, pos: usize) -> bool {
        self.peek(pos).is_some_and(is_tag_char)
    }

    #[inline]
    pub fn is_quote(&self, pos: usize) -> bool {
        self.peek(pos).is_some_and(is_quote)
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    pub fn skip_whitespace(&mut self, mut pos: usize) -> usize {
        while self.is_whitespace(pos) {
            pos += 1;
        }
        self.record(pos)
    }

    /// Find the next '<' at or after `pos` using SIMD
    #[inline]
    pub fn find_tag_start(&self, pos: usize) -> Option<usize> {
        let rest = self.input.get(pos..)?;
        memchr(b'<', rest).map(|i| pos + i)
    }

    /// Find the next occurrence of `needle` at or after `pos`
    #[inline]
    pub fn find(&self, pos: usize, needle: &[u8]) -> Option<usize> {
        let rest = self.input.get(pos..)?;
        memmem::find(rest, needle).map(|i| pos + i)
    }

    /// End of an unquoted value: the next whitespace, '>' or "/>"
    pub fn find_unquoted_value_end(&self, pos: usize) -> usize {
        let mut end = pos;
        while let Some(b) = self.peek(end) {
            if is_whitespace(b) || b == b'>' {
                break;
            }
            if b == b'/' && self.peek(end + 1) == Some(b'>') {
                break;
            }
            end += 1;
        }
        end
    }

    /// Read a name token (`[A-Za-z][A-Za-z0-9-]*`) starting at `pos`.
    ///
    /// Returns the position just past the token.
    pub fn read_name(&mut self, pos: usize) -> ParseResult {
        if !self.is_valid_tag_start(pos) {
            return Err(match self.peek(pos) {
                Some(_) => ParseError::InvalidNameStart { position: pos },
                None => ParseError::UnexpectedEof { position: pos },
            });
        }

        let mut end = pos + 1;
        while self.is_valid_tag_char(end) {
            end += 1;
        }

        Ok(self.record(end))
    }

    /// Read a quoted literal starting at the quote character at `pos`.
    ///
    /// The literal ends at the first occurrence of the same quote character;
    /// there is no escaping. Returns the position just past the closing quote.
    pub fn read_literal(&mut self, pos: usize) -> ParseResult {
        let quote = self.expect_byte(pos)?;
        if !is_quote(quote) {
            return Err(ParseError::MalformedAttribute { position: pos });
        }

        let rest = &self.input[pos + 1..];
        match memchr(quote, rest) {
            Some(i) => Ok(self.record(pos + 1 + i + 1)),
            None => Err(ParseError::UnterminatedLiteral { position: pos }),
        }
    }

    /// Read either a quoted literal or a bare name token at `pos`
    pub fn read_token(&mut self, pos: usize) -> ParseResult {
        if self.is_quote(pos) {
            self.read_literal(pos)
        } else {
            self.read_name(pos)
        }
    }
}

/// Whitespace as far as tag syntax is concerned
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_tag_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

#[inline]
fn is_tag_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-')
}

#[inline]
pub fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        let scanner = Scanner::new("hello <world>");
        assert_eq!(scanner.find_tag_start(0), Some(6));
        assert_eq!(scanner.find_tag_start(7), None);
        assert_eq!(scanner.find_tag_start(100), None);
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new("element-name2>");
        assert_eq!(scanner.read_name(0), Ok(13));
        assert_eq!(scanner.last_position(), 13);
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = Scanner::new("1abc");
        assert_eq!(
            scanner.read_name(0),
            Err(ParseError::InvalidNameStart { position: 0 })
        );
        assert_eq!(
            scanner.read_name(4),
            Err(ParseError::UnexpectedEof { position: 4 })
        );
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new("  \t\n hello");
        assert_eq!(scanner.skip_whitespace(0), 5);
        assert_eq!(scanner.skip_whitespace(5), 5);
        assert_eq!(scanner.skip_whitespace(10), 10);
    }

    #[test]
    fn test_read_literal_matching_quote() {
        let mut scanner = Scanner::new("'say \"hi\"' rest");
        assert_eq!(scanner.read_literal(0), Ok(10));

        let mut scanner = Scanner::new("\"it's\"");
        assert_eq!(scanner.read_literal(0), Ok(6));
    }

    #[test]
    fn test_read_literal_unterminated() {
        let mut scanner = Scanner::new("\"never closed");
        assert_eq!(
            scanner.read_literal(0),
            Err(ParseError::UnterminatedLiteral { position: 0 })
        );
    }

    #[test]
    fn test_high_water_mark_is_monotonic() {
        let mut scanner = Scanner::new("abcdef");
        assert_eq!(scanner.record(4), 4);
        assert_eq!(scanner.record(2), 2);
        assert_eq!(scanner.last_position(), 4);
    }

    #[test]
    fn test_character_classes() {
        let scanner = Scanner::new("a-9 ");
        assert!(scanner.is_alpha(0));
        assert!(scanner.is_valid_tag_start(0));
        assert!(!scanner.is_valid_tag_start(1));
        assert!(scanner.is_valid_tag_char(1));
        assert!(scanner.is_valid_tag_char(2));
        assert!(scanner.is_whitespace(3));
        assert!(!scanner.is_alpha(4));
    }

    #[test]
    fn test_find_substring() {
        let scanner = Scanner::new("<!-- x --> y");
        assert_eq!(scanner.find(0, b"-->"), Some(7));
        assert!(scanner.starts_with(0, b"<!--"));
        assert!(!scanner.starts_with(11, b"y z"));
    }

    #[test]
    fn test_unquoted_value_end() {
        let scanner = Scanner::new("x.png/>");
        assert_eq!(scanner.find_unquoted_value_end(0), 5);
        let scanner = Scanner::new("a/b c");
        assert_eq!(scanner.find_unquoted_value_end(0), 3);
    }
}
