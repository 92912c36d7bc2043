//! Fuzz target for commit parsing.
//!
//! Tests that the parser handles arbitrary input without panicking, and
//! that every commit it accepts renders back to a stream that parses to
//! the same commit.

#![no_main]

use gitexport::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut parser = Parser::from_reader(data);

    for _ in 0..1_000 {
        match parser.next_commit() {
            Ok(Some(commit)) => {
                let rendered = commit.to_bytes();
                let reparsed = Parser::from_reader(rendered.as_slice())
                    .commit()
                    .expect("rendered commit must parse");
                assert_eq!(reparsed, commit);
            }
            Ok(None) | Err(_) => break,
        }
    }
});
