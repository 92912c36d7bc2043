//! Reader and writer for the git fast-export stream format.
//!
//! This crate tokenizes the line-oriented stream consumed by
//! `git fast-import`, parses `commit` records out of it and renders them
//! back into the exact wire form.
//!
//! See: https://git-scm.com/docs/git-fast-import

mod commit;
mod data;
mod error;
mod lexer;
mod parser;
mod person;
mod token;

pub use commit::{Commit, FileCommand, FileCommandKind};
pub use error::StreamError;
pub use lexer::{classify, Lexer, ReadEnd};
pub use parser::Parser;
pub use person::Person;
pub use token::Token;

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
