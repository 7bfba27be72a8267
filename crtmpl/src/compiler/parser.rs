//! Builds the node tree from the token stream.
use std::borrow::Cow;

use crate::compiler::ast::{Loop, Node, Spanned, Text, Var};
use crate::compiler::lexer::Tokenizer;
use crate::compiler::tokens::{Token, LOOP_MARKER};
use crate::error::Error;

const MAX_NESTING: usize = 150;

/// Builds the node tree from the token stream.
///
/// Loops are not closed by a dedicated end tag.  A loop opened by the
/// control `{/path}` ends at the next control at the same depth whose text
/// is byte-identical (`{/path}` again).  A loop that never sees its
/// closing control runs until the end of the template.
struct Parser<'a> {
    stream: Tokenizer<'a>,
    depth: usize,
}

fn strip_marker(text: Cow<'_, str>) -> Cow<'_, str> {
    let marker_len = LOOP_MARKER.len_utf8();
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(&s[marker_len..]),
        Cow::Owned(s) => Cow::Owned(s[marker_len..].to_string()),
    }
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Parser<'a> {
        Parser {
            stream: Tokenizer::new(source),
            depth: 0,
        }
    }

    fn subparse(&mut self, end: Option<&str>) -> Result<Vec<Node<'a>>, Error> {
        let mut rv = Vec::new();
        while let Some((token, span)) = self.stream.next_token()? {
            match token {
                Token::Literal(content) => {
                    rv.push(Node::Text(Spanned::new(Text { content }, span)));
                }
                Token::Control(text) => {
                    if end == Some(&*text) {
                        return Ok(rv);
                    }
                    if text.starts_with(LOOP_MARKER) {
                        self.depth += 1;
                        if self.depth > MAX_NESTING {
                            return Err(Error::syntax(
                                "template exceeds maximum loop nesting",
                                span,
                            ));
                        }
                        let body = self.subparse(Some(&text))?;
                        self.depth -= 1;
                        let path = strip_marker(text);
                        rv.push(Node::Loop(Spanned::new(Loop { path, body }, span)));
                    } else {
                        rv.push(Node::Value(Spanned::new(Var { path: text }, span)));
                    }
                }
            }
        }
        Ok(rv)
    }
}

/// Parses a template into its node tree.
pub fn parse(source: &str) -> Result<Vec<Node<'_>>, Error> {
    Parser::new(source).subparse(None)
}
