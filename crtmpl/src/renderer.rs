use crate::compiler::ast::Node;
use crate::error::Error;
use crate::output::Output;
use crate::scope::resolve;
use crate::value::Value;

/// Walks the node tree and writes the result into the output.
///
/// `local` is the value of the innermost loop iteration (none at the top
/// level).  Every loop iteration renders its body with the element as the
/// new `local` while `bindings` stays the same for the whole call.
pub(crate) fn render_nodes(
    nodes: &[Node<'_>],
    local: &Value,
    bindings: &Value,
    out: &mut Output,
) -> Result<(), Error> {
    for node in nodes {
        match node {
            Node::Text(text) => out.write_str(&text.content)?,
            Node::Value(var) => {
                let value =
                    resolve(&var.path, local, bindings).map_err(|e| e.located(var.span()))?;
                write!(out, "{}", value)?;
            }
            Node::Loop(l) => {
                let located = |e: Error| e.located(l.span());
                let collection = resolve(&l.path, local, bindings).map_err(located)?;
                for item in collection.try_iter().map_err(located)? {
                    render_nodes(&l.body, &item, bindings, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Renders a node tree with an explicit `local` value.
///
/// This is the entry point for rendering a tree produced by
/// [`parse`](crate::machinery::parse) directly, for instance to render a
/// sub-tree for a single element.
#[cfg(feature = "unstable_machinery")]
pub fn render_tree(nodes: &[Node<'_>], local: &Value, bindings: &Value) -> Result<String, Error> {
    let mut rv = String::new();
    render_nodes(nodes, local, bindings, &mut Output::new(&mut rv))?;
    Ok(rv)
}
