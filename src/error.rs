//! Parse failure reasons
//!
//! Every failure carries the byte position where it was detected. Failures
//! fall in two classes:
//! - Recoverable: the `<` at hand does not open a well-formed start tag.
//!   Inside a body this is not an error, the `<` is treated as text.
//! - Unterminated: a construct that started fine never ends. These abort
//!   the enclosing tags up to the top-level loop.

use thiserror::Error;

/// Result of a scanning step: the advanced position, or why it failed
pub type ParseResult<T = usize> = Result<T, ParseError>;

/// Why a parsing step failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at byte {position}")]
    UnexpectedEof { position: usize },

    #[error("expected '<' at byte {position}")]
    ExpectedTagOpen { position: usize },

    #[error("invalid name start at byte {position}")]
    InvalidNameStart { position: usize },

    #[error("malformed attribute at byte {position}")]
    MalformedAttribute { position: usize },

    #[error("unterminated quoted literal starting at byte {position}")]
    UnterminatedLiteral { position: usize },

    #[error("start tag is not closed at byte {position}")]
    UnclosedStartTag { position: usize },

    #[error("script body starting at byte {position} has no closing tag")]
    UnterminatedScript { position: usize },

    #[error("no matching </{name}> for body starting at byte {position}")]
    UnterminatedBody { name: String, position: usize },

    #[error("tag nesting deeper than {limit} at byte {position}")]
    NestingTooDeep { limit: usize, position: usize },
}

impl ParseError {
    /// Byte position where the failure was detected
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedEof { position }
            | ParseError::ExpectedTagOpen { position }
            | ParseError::InvalidNameStart { position }
            | ParseError::MalformedAttribute { position }
            | ParseError::UnterminatedLiteral { position }
            | ParseError::UnclosedStartTag { position }
            | ParseError::UnterminatedScript { position }
            | ParseError::UnterminatedBody { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }

    /// Whether a body scan may treat the offending `<` as literal text
    /// and continue one byte further.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ParseError::UnterminatedScript { .. }
                | ParseError::UnterminatedBody { .. }
                | ParseError::NestingTooDeep { .. }
        )
    }
}
