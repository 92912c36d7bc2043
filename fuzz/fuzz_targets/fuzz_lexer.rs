//! Fuzz target for export stream lexing.
//!
//! Tests that classification and data extraction handle arbitrary input
//! without panicking.

#![no_main]

use gitexport::{Lexer, Token};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut lexer = Lexer::new(Cursor::new(data));

    // Bounded in case a crafted input never reaches end of stream
    for _ in 0..10_000 {
        match lexer.token() {
            Token::Eof | Token::Error => break,
            Token::Data => {
                if lexer.consume_data().is_err() {
                    break;
                }
            }
            _ => lexer.advance(),
        }
    }
});
