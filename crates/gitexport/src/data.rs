//! Data block extraction.
//!
//! A `data` command carries its payload in one of two forms:
//!
//! - byte-counted: `data <count>\n` followed by exactly `count` raw bytes
//! - delimited: `data <<DELIM\n` followed by lines up to a line equal to `DELIM`
//!
//! See: https://git-scm.com/docs/git-fast-import#_data

use crate::lexer::{read_line, Lexer, ReadEnd};
use crate::token::Token;
use crate::{Result, StreamError};
use std::io::{BufRead, Read};

/// Parsed argument of a `data` line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DataHeader {
    Counted(u64),
    Delimited(String),
}

impl DataHeader {
    fn parse(line: &[u8]) -> Option<Self> {
        let arg = line.strip_prefix(b"data ")?.strip_suffix(b"\n")?;
        let arg = std::str::from_utf8(arg).ok()?;

        if let Some(delimiter) = arg.strip_prefix("<<") {
            if delimiter.is_empty() || delimiter.contains(' ') {
                return None;
            }
            return Some(Self::Delimited(delimiter.to_string()));
        }

        if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        arg.parse().ok().map(Self::Counted)
    }
}

impl<R: BufRead> Lexer<R> {
    /// Consumes a data block and returns its payload.
    ///
    /// On success the cursor is left on the line following the payload.
    /// An unterminated delimited block is reported as
    /// [`StreamError::UnterminatedData`], which keeps the bytes read so far.
    pub fn consume_data(&mut self) -> Result<Vec<u8>> {
        if self.token() != Token::Data {
            return Err(StreamError::NotOnData {
                line: self.line_number(),
                found: self.token(),
            });
        }

        let header =
            DataHeader::parse(self.line()).ok_or_else(|| StreamError::InvalidByteCount {
                line: self.line_number(),
                header: String::from_utf8_lossy(self.line()).trim_end().to_string(),
            })?;

        match header {
            DataHeader::Counted(count) => {
                let data = self.read_counted(count)?;
                self.advance();
                Ok(data)
            }
            DataHeader::Delimited(delimiter) => {
                let result = self.read_delimited(delimiter);
                self.advance();
                result
            }
        }
    }

    fn read_counted(&mut self, count: u64) -> Result<Vec<u8>> {
        let line = self.line_number;
        let mut data = Vec::new();
        let read = (&mut self.reader)
            .take(count)
            .read_to_end(&mut data)
            .map_err(|source| StreamError::Stream { line, source })?;

        if (read as u64) < count {
            return Err(StreamError::ShortRead {
                line,
                expected: count,
                read: read as u64,
            });
        }

        self.line_number += data.iter().filter(|&&b| b == b'\n').count();
        tracing::trace!(line, len = data.len(), "read counted data block");

        Ok(data)
    }

    fn read_delimited(&mut self, delimiter: String) -> Result<Vec<u8>> {
        let start = self.line_number;
        let mut data = Vec::new();

        loop {
            let (line, end) = read_line(&mut self.reader);
            if !line.is_empty() {
                self.line_number += 1;
            }

            let terminated = match line.strip_suffix(b"\n") {
                Some(body) => body == delimiter.as_bytes(),
                None => matches!(end, Some(ReadEnd::Eof)) && line == delimiter.as_bytes(),
            };
            if terminated {
                tracing::trace!(line = start, len = data.len(), "read delimited data block");
                return Ok(data);
            }

            data.extend_from_slice(&line);

            if let Some(end) = end {
                return Err(StreamError::UnterminatedData {
                    line: self.line_number,
                    delimiter,
                    partial: data,
                    source: match end {
                        ReadEnd::Eof => None,
                        ReadEnd::Error(err) => Some(err),
                    },
                });
            }
        }
    }
}
