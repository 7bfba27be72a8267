#![cfg(feature = "unstable_machinery")]
use crtmpl::machinery::{parse, render_tree, tokenize, Node, Token};
use crtmpl::value::Value;
use crtmpl::{context, Template};

use similar_asserts::assert_eq;

fn dump(nodes: &[Node<'_>], depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node {
            Node::Text(text) => out.push_str(&format!("{indent}text {:?}\n", text.content)),
            Node::Value(var) => out.push_str(&format!("{indent}value {}\n", var.path)),
            Node::Loop(l) => {
                out.push_str(&format!("{indent}loop {}\n", l.path));
                dump(&l.body, depth + 1, out);
            }
        }
    }
}

#[test]
fn test_token_stream() {
    let tokens = tokenize("<a href=\"{.control_function}\">{/controls}")
        .map(|x| x.map(|(token, span)| (token, span.start_col)))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        tokens,
        vec![
            (Token::Literal("<a href=\"".into()), 1),
            (Token::Control(".control_function".into()), 10),
            (Token::Literal("\">".into()), 29),
            (Token::Control("/controls".into()), 31),
        ]
    );
}

#[test]
fn test_tokenize_is_restartable() {
    let source = "a{b}\\{c\\}{/d}e{/d}";
    let first = tokenize(source).collect::<Result<Vec<_>, _>>().unwrap();
    let second = tokenize(source).collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_tree_shape() {
    let nodes = parse("{/files}{.path}\n{/.hunks}- {.}\n{/.hunks}{/files}done").unwrap();
    let mut out = String::new();
    dump(&nodes, 0, &mut out);
    assert_eq!(
        out,
        "loop files\n  value .path\n  text \"\\n\"\n  loop .hunks\n    text \"- \"\n    value .\n    text \"\\n\"\ntext \"done\"\n"
    );
}

#[test]
fn test_render_tree_with_local() {
    let nodes = parse("{.author}: {.content} ({suffix})").unwrap();
    let local = context!(author => "ann", content => "hi");
    let rv = render_tree(&nodes, &local, &context!(suffix => "draft")).unwrap();
    assert_eq!(rv, "ann: hi (draft)");
}

#[test]
fn test_render_tree_top_level_local_is_none() {
    let nodes = parse("[{.}]").unwrap();
    let rv = render_tree(&nodes, &Value::from(()), &context!()).unwrap();
    assert_eq!(rv, "[none]");
}

#[test]
fn test_template_exposes_nodes() {
    let tmpl = Template::new("x{y}").unwrap();
    assert_eq!(tmpl.nodes().len(), 2);
    assert_eq!(tmpl.nodes()[1].span().start_col, 2);
}

#[test]
fn test_error_span() {
    let err = parse("ab\ncd {x").unwrap_err();
    let span = err.span().unwrap();
    assert_eq!((span.start_line, span.start_col), (2, 4));
    assert_eq!(span.start_offset, 6);
}
