//! Tokens and their source locations.
use std::borrow::Cow;
use std::fmt;

/// The leading character of a control that opens (and closes) a loop.
pub const LOOP_MARKER: char = '/';

/// Represents a token in the stream.
///
/// Tokens borrow from the template source unless an escape sequence
/// rewrote their text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw template data that is emitted verbatim.
    Literal(Cow<'a, str>),
    /// The text between a `{` and its matching `}`.
    Control(Cow<'a, str>),
}

impl Token<'_> {
    /// Returns the text carried by the token.
    pub fn text(&self) -> &str {
        match self {
            Token::Literal(text) | Token::Control(text) => text,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(_) => f.write_str("template-data"),
            Token::Control(text) if text.starts_with(LOOP_MARKER) => f.write_str("loop marker"),
            Token::Control(_) => f.write_str("lookup"),
        }
    }
}

/// Token span information.
///
/// Lines and columns are 1-based, the end position is exclusive.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Line of the first character.
    pub start_line: u32,
    /// Column of the first character.
    pub start_col: u32,
    /// Byte offset of the first character.
    pub start_offset: u32,
    /// Line of the position after the last character.
    pub end_line: u32,
    /// Column of the position after the last character.
    pub end_col: u32,
    /// Byte offset of the position after the last character.
    pub end_offset: u32,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " @ {}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}
