//! crtmpl is a small template engine for rendering code-review overlays:
//! comment threads, review controls and similar snippets of markup that an
//! editor integration displays inline.  It is implemented on top of
//! [`serde`] so any serializable data can be rendered.
//!
//! The template language only knows two constructs.  Curly braces look up
//! a dotted path and write out its value:
//!
//! ```plain
//! <span style="width: {context.width}px">{context.title}</span>
//! ```
//!
//! A control starting with a slash opens a loop.  The loop body ends at the
//! next control with exactly the same text and is rendered once per element
//! of the collection.  Inside the body, paths starting with a dot are looked
//! up on the current element:
//!
//! ```plain
//! {/comments}<div class="comment"><b>{.author}</b> {.content}</div>{/comments}
//! ```
//!
//! Looping over a mapping yields one record per entry with the fields `key`
//! and `value`.  Literal braces are written as `\{` and `\}`.
//!
//! # Template Usage
//!
//! For one-off rendering use [`render`].  If a template is rendered more
//! than once, parse it once into a [`Template`]:
//!
//! ```
//! use crtmpl::{Template, context};
//!
//! let tmpl = Template::new("{/comments}<b>{.author}</b>: {.content}\n{/comments}").unwrap();
//! let rv = tmpl.render(context! {
//!     comments => vec![
//!         context!(author => "ann", content => "Looks good"),
//!         context!(author => "ted", content => "Fixed"),
//!     ]
//! }).unwrap();
//! assert_eq!(rv, "<b>ann</b>: Looks good\n<b>ted</b>: Fixed\n");
//! ```
//!
//! For super trivial cases the [`render!`] macro acts a bit like a
//! replacement for the [`format!`] macro.
//!
//! # Error Handling
//!
//! Malformed templates fail with a syntax error pointing at the offending
//! brace.  Lookups of missing names, keys or fields fail the whole render
//! call; there is no partial output.  See [`Error`] for details.
//!
//! # Optional Features
//!
//! - `debug`: embeds the template source into errors so that the
//!   alternative display (`{:#}`) prints an excerpt of the template.
//!   Enabled by default.
//! - `preserve_order`: mappings keep insertion order instead of being
//!   sorted by key.  This affects the order of loops over mappings.
//! - `unstable_machinery`: exposes the tokenizer and tree builder.
#![allow(clippy::new_without_default)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[macro_use]
mod macros;

mod compiler;
mod debug;
mod error;
mod output;
mod renderer;
mod scope;
mod template;
pub mod value;

pub use self::error::{Error, ErrorKind};
pub use self::scope::resolve;
pub use self::template::{render, Template};

#[doc(hidden)]
pub use self::macros::__context;

/// This module gives access to the low level machinery.
///
/// This module is only provided by the `unstable_machinery` feature and does not
/// have a stable interface.  It mostly exists for internal testing purposes and
/// for debugging.
#[cfg(feature = "unstable_machinery")]
#[cfg_attr(docsrs, doc(cfg(feature = "unstable_machinery")))]
pub mod machinery {
    #![allow(missing_docs)]
    pub use crate::compiler::ast::{self, Node};
    pub use crate::compiler::lexer::{tokenize, Tokenizer};
    pub use crate::compiler::parser::parse;
    pub use crate::compiler::tokens::{Span, Token, LOOP_MARKER};
    pub use crate::renderer::render_tree;
}
