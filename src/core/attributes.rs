//! Attribute list parsing
//!
//! Consumes the attributes of one start tag, from just after the tag name
//! up to the tag terminator (`>`, `/>` or `?>`). Values are taken verbatim,
//! there is no entity decoding and no escaping inside quotes.

use super::scanner::{is_quote, is_whitespace, Scanner};
use crate::error::{ParseError, ParseResult};

/// Receives what the attribute parser finds
pub trait AttributeSink<'a> {
    /// A regular attribute. Bare attributes arrive with `value == name`.
    fn attribute(&mut self, name: &'a str, value: &'a str);

    /// An `xmlns:prefix` declaration
    fn namespace(&mut self, prefix: &'a str, value: &'a str);
}

/// Parse the attribute list starting at `pos`.
///
/// Returns the position of the terminator: the `>`, the `/` of `/>` or the
/// `?` of `?>`. With `lax_values` set (HTML documents) an attribute value may
/// be unquoted, running up to whitespace, `>` or `/>`.
pub fn parse_attributes<'a, S: AttributeSink<'a>>(
    scanner: &mut Scanner<'a>,
    mut pos: usize,
    lax_values: bool,
    sink: &mut S,
) -> ParseResult {
    loop {
        if is_terminator(scanner, pos) {
            return Ok(scanner.record(pos));
        }

        let name_start = pos;
        let name_end = scanner.read_token(name_start)?;
        let quoted = scanner.is_quote(name_start);
        let mut name = scanner.token_text(name_start, name_end);
        let mut ns_prefix = None;
        pos = name_end;

        if scanner.peek(pos) == Some(b':') {
            if quoted {
                return Err(ParseError::MalformedAttribute { position: pos });
            }
            let local_start = pos + 1;
            let local_end = scanner.read_name(local_start)?;
            if name == "xmlns" {
                ns_prefix = Some(scanner.text(local_start, local_end));
            } else {
                name = scanner.text(name_start, local_end);
            }
            pos = local_end;
        }

        let next = scanner.expect_byte(pos)?;

        if next == b'=' {
            let (value, value_end) = read_value(scanner, pos + 1, lax_values)?;
            emit(sink, name, ns_prefix, value);
            pos = scanner.skip_whitespace(value_end);
            continue;
        }

        // Everything else is a bare attribute, as long as it is properly
        // followed by whitespace or the end of the tag.
        if is_whitespace(next) {
            emit_bare(sink, name, ns_prefix);
            pos = scanner.skip_whitespace(pos);
        } else if is_terminator(scanner, pos) {
            emit_bare(sink, name, ns_prefix);
            return Ok(scanner.record(pos));
        } else {
            return Err(ParseError::MalformedAttribute { position: pos });
        }
    }
}

/// `>`, `/>` or `?>` at `pos`
#[inline]
fn is_terminator(scanner: &Scanner<'_>, pos: usize) -> bool {
    match scanner.peek(pos) {
        Some(b'>') => true,
        Some(b'/') | Some(b'?') => scanner.peek(pos + 1) == Some(b'>'),
        _ => false,
    }
}

/// Read the value after `=`. Returns the value and the position past it.
fn read_value<'a>(
    scanner: &mut Scanner<'a>,
    pos: usize,
    lax_values: bool,
) -> ParseResult<(&'a str, usize)> {
    let first = scanner.expect_byte(pos)?;

    if is_quote(first) {
        let end = scanner.read_literal(pos)?;
        return Ok((scanner.text(pos + 1, end - 1), end));
    }

    if lax_values && !is_whitespace(first) && first != b'>' {
        let end = scanner.find_unquoted_value_end(pos);
        if end > pos {
            return Ok((scanner.text(pos, end), scanner.record(end)));
        }
    }

    Err(ParseError::MalformedAttribute { position: pos })
}

#[inline]
fn emit<'a, S: AttributeSink<'a>>(
    sink: &mut S,
    name: &'a str,
    ns_prefix: Option<&'a str>,
    value: &'a str,
) {
    match ns_prefix {
        Some(prefix) => sink.namespace(prefix, value),
        None => sink.attribute(name, value),
    }
}

#[inline]
fn emit_bare<'a, S: AttributeSink<'a>>(sink: &mut S, name: &'a str, ns_prefix: Option<&'a str>) {
    match ns_prefix {
        Some(prefix) => sink.namespace(prefix, ""),
        None => sink.attribute(name, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collected<'a> {
        attributes: Vec<(&'a str, &'a str)>,
        namespaces: Vec<(&'a str, &'a str)>,
    }

    impl<'a> AttributeSink<'a> for Collected<'a> {
        fn attribute(&mut self, name: &'a str, value: &'a str) {
            self.attributes.push((name, value));
        }

        fn namespace(&mut self, prefix: &'a str, value: &'a str) {
            self.namespaces.push((prefix, value));
        }
    }

    fn parse(input: &str, lax: bool) -> (ParseResult, Collected<'_>) {
        let mut scanner = Scanner::new(input);
        let mut sink = Collected::default();
        let result = parse_attributes(&mut scanner, 0, lax, &mut sink);
        (result, sink)
    }

    #[test]
    fn test_simple_attributes() {
        let (end, sink) = parse("id=\"test\" class='foo'>", false);
        assert_eq!(end, Ok(21));
        assert_eq!(sink.attributes, vec![("id", "test"), ("class", "foo")]);
    }

    #[test]
    fn test_bare_attribute_value_is_name() {
        let (end, sink) = parse("disabled>", false);
        assert_eq!(end, Ok(8));
        assert_eq!(sink.attributes, vec![("disabled", "disabled")]);

        let (_, sink) = parse("checked  readonly value=\"1\">", false);
        assert_eq!(
            sink.attributes,
            vec![("checked", "checked"), ("readonly", "readonly"), ("value", "1")]
        );
    }

    #[test]
    fn test_stops_at_self_close() {
        let (end, sink) = parse("src=\"a.png\" />", false);
        assert_eq!(end, Ok(12));
        assert_eq!(sink.attributes, vec![("src", "a.png")]);

        let (end, sink) = parse("hidden/>", false);
        assert_eq!(end, Ok(6));
        assert_eq!(sink.attributes, vec![("hidden", "hidden")]);
    }

    #[test]
    fn test_stops_at_processing_instruction_end() {
        let (end, sink) = parse("version=\"1.0\"?>", false);
        assert_eq!(end, Ok(13));
        assert_eq!(sink.attributes, vec![("version", "1.0")]);
    }

    #[test]
    fn test_no_attributes() {
        let (end, sink) = parse(">", false);
        assert_eq!(end, Ok(0));
        assert!(sink.attributes.is_empty());
    }

    #[test]
    fn test_namespace_declaration() {
        let (_, sink) = parse("xmlns:foo=\"bar\" id=\"x\">", false);
        assert_eq!(sink.namespaces, vec![("foo", "bar")]);
        assert_eq!(sink.attributes, vec![("id", "x")]);
    }

    #[test]
    fn test_prefixed_attribute_keeps_full_name() {
        let (_, sink) = parse("xlink:href=\"#a\">", false);
        assert_eq!(sink.attributes, vec![("xlink:href", "#a")]);
        assert!(sink.namespaces.is_empty());
    }

    #[test]
    fn test_quoted_name() {
        let (_, sink) = parse("html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\">", false);
        assert_eq!(
            sink.attributes,
            vec![
                ("html", "html"),
                ("PUBLIC", "PUBLIC"),
                ("-//W3C//DTD XHTML 1.0 Strict//EN", "-//W3C//DTD XHTML 1.0 Strict//EN"),
            ]
        );
    }

    #[test]
    fn test_value_keeps_other_quote() {
        let (_, sink) = parse("title='say \"hi\"'>", false);
        assert_eq!(sink.attributes, vec![("title", "say \"hi\"")]);
    }

    #[test]
    fn test_equals_without_quote_fails_strict() {
        let (end, _) = parse("src=x.png>", false);
        assert_eq!(end, Err(ParseError::MalformedAttribute { position: 4 }));
    }

    #[test]
    fn test_unquoted_value_in_lax_mode() {
        let (end, sink) = parse("src=x.png alt=y/>", true);
        assert_eq!(end, Ok(15));
        assert_eq!(sink.attributes, vec![("src", "x.png"), ("alt", "y")]);
    }

    #[test]
    fn test_unterminated_value() {
        let (end, _) = parse("title=\"oops>", false);
        assert_eq!(end, Err(ParseError::UnterminatedLiteral { position: 6 }));
    }

    #[test]
    fn test_runs_out_of_input() {
        let (end, _) = parse("id=\"x\"", false);
        assert_eq!(end, Err(ParseError::UnexpectedEof { position: 6 }));
    }
}
