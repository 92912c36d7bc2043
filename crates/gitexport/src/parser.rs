//! Export stream parser.
//!
//! Parses `commit` records on top of the [`Lexer`]. The other record kinds
//! are recognized but reported as [`StreamError::Unsupported`].

use crate::commit::{Commit, FileCommand};
use crate::lexer::Lexer;
use crate::person::Person;
use crate::token::Token;
use crate::{Result, StreamError};
use std::io::{BufRead, BufReader, Read};

/// Parser over an export stream.
pub struct Parser<R> {
    lexer: Lexer<R>,
}

impl<R: Read> Parser<BufReader<R>> {
    /// Creates a parser over an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(Lexer::from_reader(reader))
    }
}

impl<R: BufRead> Parser<R> {
    /// Creates a parser positioned at the lexer's current line.
    pub fn new(lexer: Lexer<R>) -> Self {
        Self { lexer }
    }

    /// Returns the lexer.
    pub fn lexer(&self) -> &Lexer<R> {
        &self.lexer
    }

    /// Returns the lexer mutably, e.g. to skip a record by hand.
    pub fn lexer_mut(&mut self) -> &mut Lexer<R> {
        &mut self.lexer
    }

    /// Consumes the parser and returns the lexer.
    pub fn into_lexer(self) -> Lexer<R> {
        self.lexer
    }

    /// Parses one commit starting at the current line.
    ///
    /// The current token must be `commit`; otherwise nothing is consumed.
    /// On success the cursor is left on the first line after the commit.
    /// A failed parse leaves the cursor where the error was detected.
    pub fn commit(&mut self) -> Result<Commit> {
        if self.lexer.token() != Token::Commit {
            return Err(StreamError::WrongToken {
                line: self.lexer.line_number(),
                expected: Token::Commit,
                found: self.lexer.token(),
            });
        }

        let start = self.lexer.line_number();
        match self.parse_commit() {
            Ok(commit) => {
                tracing::debug!(
                    line = start,
                    reference = %commit.reference,
                    mark = ?commit.mark,
                    file_commands = commit.file_commands.len(),
                    "parsed commit"
                );
                Ok(commit)
            }
            Err(e) => {
                tracing::warn!(line = start, error = %e, "failed to parse commit");
                Err(e)
            }
        }
    }

    /// Parses the next commit in the stream.
    ///
    /// Empty and comment lines before the record are skipped. Returns
    /// `Ok(None)` at end of stream. Any other record kind is an error, and
    /// the cursor is not moved past it.
    pub fn next_commit(&mut self) -> Result<Option<Commit>> {
        loop {
            match self.lexer.token() {
                Token::Empty | Token::Comment => self.lexer.advance(),
                Token::Eof => return Ok(None),
                Token::Error => return Err(self.stream_error()),
                Token::Commit => return self.commit().map(Some),
                token if token.is_record() => {
                    return Err(StreamError::Unsupported {
                        line: self.lexer.line_number(),
                        token,
                    })
                }
                _ => {
                    return Err(StreamError::InvalidRecord {
                        line: self.lexer.line_number(),
                        text: String::from_utf8_lossy(self.lexer.line())
                            .trim_end()
                            .to_string(),
                    })
                }
            }
        }
    }

    fn parse_commit(&mut self) -> Result<Commit> {
        let reference = self.required_field(1)?.to_string();
        self.lexer.advance();

        let mut mark = None;
        if self.lexer.token() == Token::Mark {
            mark = Some(self.mark()?);
            self.lexer.advance();
        }

        let mut author = None;
        if self.lexer.token() == Token::Author {
            author = Some(self.person()?);
            self.lexer.advance();
        }

        match self.lexer.token() {
            Token::Committer => {}
            Token::Error => return Err(self.stream_error()),
            _ => {
                return Err(StreamError::MissingCommitter {
                    line: self.lexer.line_number(),
                })
            }
        }
        let committer = self.person()?;
        self.lexer.advance();

        match self.lexer.token() {
            Token::Data => {}
            Token::Error => return Err(self.stream_error()),
            _ => {
                return Err(StreamError::MissingMessage {
                    line: self.lexer.line_number(),
                })
            }
        }
        let message = self.lexer.consume_data()?;

        let mut from = None;
        if self.lexer.token() == Token::From {
            from = Some(self.required_field(1)?.to_string());
            self.lexer.advance();
        }

        let mut merge = Vec::new();
        while self.lexer.token() == Token::Merge {
            merge.push(self.required_field(1)?.to_string());
            self.lexer.advance();
        }

        let mut file_commands = Vec::new();
        while self.lexer.token().is_file_command() {
            file_commands.push(FileCommand::new(self.lexer.line()));
            self.lexer.advance();
        }

        Ok(Commit {
            reference,
            mark,
            author,
            committer,
            message,
            from,
            merge,
            file_commands,
        })
    }

    fn required_field(&self, index: usize) -> Result<&str> {
        self.lexer
            .field(index)
            .filter(|f| !f.is_empty())
            .ok_or(StreamError::MissingField {
                line: self.lexer.line_number(),
                token: self.lexer.token(),
                index,
            })
    }

    fn mark(&self) -> Result<u64> {
        let field = self.required_field(1)?;
        field
            .strip_prefix(':')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| StreamError::InvalidMark {
                line: self.lexer.line_number(),
                field: field.to_string(),
            })
    }

    fn person(&self) -> Result<Person> {
        Person::parse(
            self.lexer.fields(),
            self.lexer.token(),
            self.lexer.line_number(),
        )
    }

    fn stream_error(&mut self) -> StreamError {
        let line = self.lexer.line_number();
        let source = self
            .lexer
            .take_error()
            .unwrap_or_else(|| std::io::Error::other("read failed"));
        StreamError::Stream { line, source }
    }
}
