use std::collections::BTreeMap;

use crtmpl::{context, render, Error, ErrorKind, Template};

use similar_asserts::assert_eq;

fn location(err: &Error) -> (usize, usize) {
    (err.line().unwrap(), err.column().unwrap())
}

#[test]
fn test_unterminated_control() {
    let err = render("abc {def", context!()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
    assert_eq!(err.detail(), Some("found `{` while expecting `}`"));
    assert_eq!(location(&err), (1, 5));
    assert_eq!(
        err.to_string(),
        "syntax error: found `{` while expecting `}` (at 1:5)"
    );
}

#[test]
fn test_errors_on_later_lines() {
    let err = Template::new("<div>\n  <b>{name</b>\n</div>").unwrap_err();
    assert_eq!(err.detail(), Some("found `{` while expecting `}`"));
    assert_eq!(location(&err), (2, 6));

    let err = Template::new("<div>\n\n    }").unwrap_err();
    assert_eq!(err.detail(), Some("found `}` while not parsing control"));
    assert_eq!(location(&err), (3, 5));
}

#[test]
fn test_empty_control() {
    let err = render("a{}b", context!()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
    assert_eq!(err.detail(), Some("found `}` with no pending control text"));
    assert_eq!(location(&err), (1, 3));
}

#[test]
fn test_render_to_write_propagates_errors() {
    let mut buf = Vec::new();
    let tmpl = Template::new("ok {missing}").unwrap();
    let err = tmpl.render(context!()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedError);
    assert!(tmpl.render_to_write(context!(), &mut buf).is_err());
}

#[test]
fn test_bad_serialization() {
    let mut bad = BTreeMap::new();
    bad.insert(vec![1], "x");
    let err = render("{x}", context!(x => bad)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSerialization);
    assert_eq!(
        err.detail(),
        Some("map keys must be strings, numbers or bools, got sequence")
    );
}

#[test]
fn test_bindings_must_be_mapping() {
    let err = render("{x}", vec![1, 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(err.detail(), Some("bindings must be a mapping or a record"));
}

#[test]
fn test_named_display() {
    let tmpl = Template::named("reviews/chain.html", "{/xs}{.x}{/xs}").unwrap();
    let err = tmpl.render(context!(xs => vec![1])).unwrap_err();
    assert_eq!(err.name(), Some("reviews/chain.html"));
    assert_eq!(
        err.to_string(),
        "undefined value: value of type number has no field `x` (in reviews/chain.html:1:6)"
    );
}

#[test]
#[cfg(feature = "debug")]
fn test_alternate_display_has_excerpt() {
    let err = Template::named("chain.html", "<b>\n{a{b}\n</b>").unwrap_err();
    let rendered = format!("{:#}", err);
    assert!(rendered.starts_with(
        "syntax error: found `{` while expecting `}` (in chain.html:2:3)\n"
    ));
    assert!(rendered.contains("   1 | <b>\n"));
    assert!(rendered.contains("   2 > {a{b}\n"));
    assert!(rendered.contains("     i   ^ syntax error\n"));
    assert!(rendered.contains("   3 | </b>\n"));
    assert_eq!(err.template_source(), Some("<b>\n{a{b}\n</b>"));
}

#[test]
fn test_debug_format() {
    let err = render("{x}", context!()).unwrap_err();
    let debug = format!("{:?}", err);
    assert!(debug.starts_with(
        "Error { kind: UndefinedError, detail: \"binding `x` is not defined\""
    ));
    assert!(debug.contains("line: 1"));
    assert!(debug.contains("column: 1"));
}
