//! Turns template source into a node tree.
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod tokens;
