#![no_main]
use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, BTreeMap<String, Value>)| {
    let (source, bindings) = data;
    let tmpl = match crtmpl::Template::new(source) {
        Ok(tmpl) => tmpl,
        Err(_) => return,
    };
    // rendering is pure, so the same input always renders the same way
    let first = tmpl.render(&bindings).map_err(|err| err.to_string());
    let second = tmpl.render(&bindings).map_err(|err| err.to_string());
    assert_eq!(first, second);
});
