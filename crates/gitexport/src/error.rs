//! Stream error types.

use crate::token::Token;
use thiserror::Error;

/// Errors that can occur while lexing, parsing or writing an export stream.
///
/// Lexical and structural errors carry the 1-based line number at which
/// they were detected.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A `data` line matched neither the byte-counted nor the delimited form.
    #[error("line {line}: invalid data byte count: {header:?}")]
    InvalidByteCount { line: usize, header: String },

    /// The stream ended before a byte-counted payload was complete.
    #[error("line {line}: short read: expected {expected} data bytes, got {read}")]
    ShortRead { line: usize, expected: u64, read: u64 },

    /// The stream ended before the delimiter of a `data <<DELIM` block.
    ///
    /// The bytes read so far are kept in `partial`. `source` is set when
    /// the reader failed rather than running out of data.
    #[error("line {line}: data block not terminated by {delimiter:?}")]
    UnterminatedData {
        line: usize,
        delimiter: String,
        partial: Vec<u8>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Data extraction was requested while not looking at a `data` line.
    #[error("line {line}: not on a data token (found {found})")]
    NotOnData { line: usize, found: Token },

    /// The cursor was not on the token an entry point requires.
    #[error("line {line}: expected {expected}, found {found}")]
    WrongToken {
        line: usize,
        expected: Token,
        found: Token,
    },

    /// A command line lacks a required argument.
    #[error("line {line}: {token} is missing field {index}")]
    MissingField {
        line: usize,
        token: Token,
        index: usize,
    },

    /// A commit has no `committer` line.
    #[error("line {line}: missing committer")]
    MissingCommitter { line: usize },

    /// A commit has no `data` block for its message.
    #[error("line {line}: missing commit message")]
    MissingMessage { line: usize },

    /// A `mark` argument is not of the form `:<digits>`.
    #[error("line {line}: could not parse mark: {field:?}")]
    InvalidMark { line: usize, field: String },

    /// A person line has no `<email>` field.
    #[error("line {line}: missing email in {token} line")]
    MissingEmail { line: usize, token: Token },

    /// A person line has nothing after the email.
    #[error("line {line}: missing timestamp in {token} line")]
    MissingTimestamp { line: usize, token: Token },

    /// A date matched none of the accepted formats.
    ///
    /// `source` is unset when the leading weekday name was not recognized.
    #[error("line {line}: invalid timestamp {value:?}")]
    InvalidTimestamp {
        line: usize,
        value: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    /// A recognized top-level record that this crate does not parse.
    #[error("line {line}: unsupported record: {token}")]
    Unsupported { line: usize, token: Token },

    /// A line that cannot start a top-level record.
    #[error("line {line}: invalid top-level line: {text:?}")]
    InvalidRecord { line: usize, text: String },

    /// The underlying stream failed while the lexer was reading.
    #[error("line {line}: read failed: {source}")]
    Stream {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// I/O error on an output sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Returns the line number the error was detected at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidByteCount { line, .. }
            | Self::ShortRead { line, .. }
            | Self::UnterminatedData { line, .. }
            | Self::NotOnData { line, .. }
            | Self::WrongToken { line, .. }
            | Self::MissingField { line, .. }
            | Self::MissingCommitter { line }
            | Self::MissingMessage { line }
            | Self::InvalidMark { line, .. }
            | Self::MissingEmail { line, .. }
            | Self::MissingTimestamp { line, .. }
            | Self::InvalidTimestamp { line, .. }
            | Self::Unsupported { line, .. }
            | Self::InvalidRecord { line, .. }
            | Self::Stream { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }

    /// Returns the partial payload of an unterminated delimited data block.
    pub fn partial_data(&self) -> Option<&[u8]> {
        match self {
            Self::UnterminatedData { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
