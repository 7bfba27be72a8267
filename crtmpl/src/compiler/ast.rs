//! The node tree produced by the parser.
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use crate::compiler::tokens::Span;

/// Container for nodes with location info.
///
/// This container fulfills two purposes: it adds location information
/// to nodes, but it also ensures the nodes is heap allocated.  The
/// latter is useful to ensure that enum variants do not cause the enum
/// to become too large.
pub struct Spanned<T> {
    inner: Box<(T, Span)>,
}

impl<T> Spanned<T> {
    /// Creates a new spanned node.
    pub fn new(node: T, span: Span) -> Spanned<T> {
        Spanned {
            inner: Box::new((node, span)),
        }
    }

    /// Accesses the span.
    pub fn span(&self) -> Span {
        self.inner.1
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner.0, f)?;
        write!(f, "{:?}", self.inner.1)
    }
}

/// A node in the template tree.
pub enum Node<'a> {
    /// Literal output.
    Text(Spanned<Text<'a>>),
    /// A dotted lookup path whose value is written out.
    Value(Spanned<Var<'a>>),
    /// A section rendered once per element of a collection.
    Loop(Spanned<Loop<'a>>),
}

impl Node<'_> {
    /// Returns the span of the token the node was created from.
    pub fn span(&self) -> Span {
        match self {
            Node::Text(s) => s.span(),
            Node::Value(s) => s.span(),
            Node::Loop(s) => s.span(),
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(s) => fmt::Debug::fmt(s, f),
            Node::Value(s) => fmt::Debug::fmt(s, f),
            Node::Loop(s) => fmt::Debug::fmt(s, f),
        }
    }
}

/// Raw template data.
#[derive(Debug)]
pub struct Text<'a> {
    /// The literal text with escapes resolved.
    pub content: Cow<'a, str>,
}

/// A value lookup.
#[derive(Debug)]
pub struct Var<'a> {
    /// The dotted lookup path.
    pub path: Cow<'a, str>,
}

/// A loop section.
///
/// `path` is the text of the opening control without the loop marker.
#[derive(Debug)]
pub struct Loop<'a> {
    /// The dotted path of the collection.
    pub path: Cow<'a, str>,
    /// The nodes rendered once per element.
    pub body: Vec<Node<'a>>,
}
