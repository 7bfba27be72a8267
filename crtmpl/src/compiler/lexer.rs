//! Splits template source into literal and control tokens.
use std::borrow::Cow;

use crate::compiler::tokens::{Span, Token};
use crate::error::Error;

/// A position in the source: 1-based line and column plus the byte offset.
#[derive(Copy, Clone, Debug)]
struct Loc {
    line: u32,
    col: u32,
    offset: u32,
}

/// Tokenizes templates into literal and control tokens.
///
/// The tokenizer is a pure function of its input: it can be recreated at
/// any time from the same source and yields the same stream.  After the
/// first error it stops producing tokens.
pub struct Tokenizer<'s> {
    source: &'s str,
    current_line: u32,
    current_col: u32,
    current_offset: u32,
    pending_start: Loc,
    pending_owned: Option<String>,
    control_start: Option<Loc>,
    pending_escape: bool,
    failed: bool,
}

impl<'s> Tokenizer<'s> {
    /// Creates a new tokenizer.
    pub fn new(source: &'s str) -> Tokenizer<'s> {
        Tokenizer {
            source,
            current_line: 1,
            current_col: 0,
            current_offset: 0,
            pending_start: Loc {
                line: 1,
                col: 1,
                offset: 0,
            },
            pending_owned: None,
            control_start: None,
            pending_escape: false,
            failed: false,
        }
    }

    /// Produces the next token from the tokenizer.
    pub fn next_token(&mut self) -> Result<Option<(Token<'s>, Span)>, Error> {
        if self.failed {
            return Ok(None);
        }
        let rv = self.tokenize_next();
        if rv.is_err() {
            self.failed = true;
        }
        rv
    }

    fn tokenize_next(&mut self) -> Result<Option<(Token<'s>, Span)>, Error> {
        while let Some(c) = self.rest().chars().next() {
            let here = self.advance(c);

            if self.pending_escape {
                self.pending_escape = false;
                let buf = self.pending_owned.get_or_insert_with(String::new);
                if !matches!(c, '{' | '}') {
                    buf.push('\\');
                }
                buf.push(c);
                continue;
            }

            match c {
                '\\' => {
                    self.make_owned(here.offset);
                    self.pending_escape = true;
                }
                '{' => {
                    if self.control_start.is_some() {
                        return Err(Error::syntax(
                            "found `{` while expecting `}`",
                            self.span(here),
                        ));
                    }
                    let literal = self.take_literal(here);
                    self.control_start = Some(here);
                    if literal.is_some() {
                        return Ok(literal);
                    }
                }
                '}' => {
                    let start = match self.control_start.take() {
                        Some(start) => start,
                        None => {
                            return Err(Error::syntax(
                                "found `}` while not parsing control",
                                self.span(here),
                            ))
                        }
                    };
                    let text = self.take_text(here.offset);
                    if text.is_empty() {
                        return Err(Error::syntax(
                            "found `}` with no pending control text",
                            self.span(here),
                        ));
                    }
                    return Ok(Some((Token::Control(text), self.span(start))));
                }
                _ => {
                    if let Some(ref mut buf) = self.pending_owned {
                        buf.push(c);
                    }
                }
            }
        }

        // a dangling backslash has nothing left to escape
        if self.pending_escape {
            self.pending_escape = false;
            self.pending_owned
                .get_or_insert_with(String::new)
                .push('\\');
        }
        if let Some(start) = self.control_start.take() {
            return Err(Error::syntax(
                "found `{` while expecting `}`",
                Span {
                    start_line: start.line,
                    start_col: start.col,
                    start_offset: start.offset,
                    end_line: start.line,
                    end_col: start.col + 1,
                    end_offset: start.offset + 1,
                },
            ));
        }
        let end = self.loc();
        Ok(self.take_literal(end))
    }

    #[inline]
    fn rest(&self) -> &'s str {
        &self.source[self.current_offset as usize..]
    }

    /// Consumes a character and returns the location it was found at.
    fn advance(&mut self, c: char) -> Loc {
        let here = self.loc();
        self.current_offset += c.len_utf8() as u32;
        if c == '\n' {
            self.current_line += 1;
            self.current_col = 0;
        } else {
            self.current_col += 1;
        }
        here
    }

    /// The location of the next unconsumed character.
    #[inline]
    fn loc(&self) -> Loc {
        Loc {
            line: self.current_line,
            col: self.current_col + 1,
            offset: self.current_offset,
        }
    }

    #[inline]
    fn span(&self, start: Loc) -> Span {
        let end = self.loc();
        Span {
            start_line: start.line,
            start_col: start.col,
            start_offset: start.offset,
            end_line: end.line,
            end_col: end.col,
            end_offset: end.offset,
        }
    }

    /// Switches the pending buffer to an owned string once an escape
    /// makes it diverge from the source.
    fn make_owned(&mut self, upto: u32) {
        if self.pending_owned.is_none() {
            self.pending_owned = Some(
                self.source[self.pending_start.offset as usize..upto as usize].to_string(),
            );
        }
    }

    fn take_text(&mut self, end_offset: u32) -> Cow<'s, str> {
        let text = match self.pending_owned.take() {
            Some(owned) => Cow::Owned(owned),
            None => Cow::Borrowed(
                &self.source[self.pending_start.offset as usize..end_offset as usize],
            ),
        };
        self.pending_start = self.loc();
        text
    }

    fn take_literal(&mut self, end: Loc) -> Option<(Token<'s>, Span)> {
        let start = self.pending_start;
        let text = self.take_text(end.offset);
        if text.is_empty() {
            return None;
        }
        Some((
            Token::Literal(text),
            Span {
                start_line: start.line,
                start_col: start.col,
                start_offset: start.offset,
                end_line: end.line,
                end_col: end.col,
                end_offset: end.offset,
            },
        ))
    }
}

impl<'s> Iterator for Tokenizer<'s> {
    type Item = Result<(Token<'s>, Span), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Utility function to quickly tokenize into an iterator.
pub fn tokenize(input: &str) -> impl Iterator<Item = Result<(Token<'_>, Span), Error>> {
    Tokenizer::new(input)
}
