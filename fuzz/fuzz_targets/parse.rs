#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    // once the tokens are valid only deep nesting may fail the parse
    let tokens_ok = crtmpl::machinery::tokenize(input).all(|x| x.is_ok());
    match crtmpl::machinery::parse(input) {
        Ok(_) => assert!(tokens_ok),
        Err(err) => assert!(
            !tokens_ok || err.detail() == Some("template exceeds maximum loop nesting")
        ),
    }
});
