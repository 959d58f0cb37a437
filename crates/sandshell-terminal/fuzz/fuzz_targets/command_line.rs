#![no_main]

use libfuzzer_sys::fuzz_target;
use sandshell_terminal::{parse_invocation, tokenize, translate};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Tokenizer and redirect split must not panic on any line.
        let _words = tokenize(input);
        let _invocation = parse_invocation(input);

        // A rewritten line must always tokenize cleanly.
        if let Some(line) = translate(input) {
            assert!(tokenize(&line).is_ok(), "rewrite produced bad quoting: {line:?}");
        }
    }
});
