//! Line reader and classifier for export streams.
//!
//! The lexer keeps exactly one line buffered: the current line, its token,
//! its fields and its 1-based line number. [`Lexer::advance`] discards the
//! current line and reads the next one.

use crate::token::Token;
use std::io::{self, BufRead, BufReader, Read};

/// Cursor over the lines of an export stream.
pub struct Lexer<R> {
    pub(crate) reader: R,
    token: Token,
    line: Vec<u8>,
    fields: Vec<String>,
    pub(crate) line_number: usize,
    end: Option<ReadEnd>,
}

/// How the read of a line ended when it did not end with a line-feed.
#[derive(Debug)]
pub enum ReadEnd {
    /// The stream has no more data.
    Eof,
    /// The reader failed.
    Error(io::Error),
}

impl<R: Read> Lexer<BufReader<R>> {
    /// Creates a lexer over an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> Lexer<R> {
    /// Creates a lexer and reads the first line.
    pub fn new(reader: R) -> Self {
        let mut lexer = Self {
            reader,
            token: Token::Eof,
            line: Vec::new(),
            fields: Vec::new(),
            line_number: 0,
            end: None,
        };
        lexer.advance();
        lexer
    }

    /// Discards the current line and reads the next one.
    pub fn advance(&mut self) {
        let (line, end) = read_line(&mut self.reader);
        self.token = classify(&line, end.as_ref());
        self.fields = split_fields(&line);
        self.line = line;
        self.end = end;
        self.line_number += 1;

        tracing::trace!(line = self.line_number, token = %self.token, "classified line");
    }

    /// Returns the token of the current line.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Returns the raw current line, including its line-feed if present.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// Returns the current line split on single spaces, without the line-feed.
    ///
    /// Empty at end of stream.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Returns the 1-based number of the current line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns how the read of the current line ended, if it had no line-feed.
    pub fn read_end(&self) -> Option<&ReadEnd> {
        self.end.as_ref()
    }

    /// Returns the error that ended the last read, if the reader failed.
    pub fn error(&self) -> Option<&io::Error> {
        match &self.end {
            Some(ReadEnd::Error(err)) => Some(err),
            _ => None,
        }
    }

    /// Takes the error that ended the last read.
    pub fn take_error(&mut self) -> Option<io::Error> {
        match self.end.take() {
            Some(ReadEnd::Error(err)) => Some(err),
            end => {
                self.end = end;
                None
            }
        }
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Reads one line including its line-feed.
///
/// A line that ends without a line-feed is paired with the reason the read
/// stopped. Errors of any kind from the reader are [`ReadEnd::Error`].
pub(crate) fn read_line<R: BufRead>(reader: &mut R) -> (Vec<u8>, Option<ReadEnd>) {
    let mut line = Vec::new();
    match reader.read_until(b'\n', &mut line) {
        Ok(_) if line.last() == Some(&b'\n') => (line, None),
        Ok(_) => (line, Some(ReadEnd::Eof)),
        Err(e) => (line, Some(ReadEnd::Error(e))),
    }
}

/// Classifies a line by its first field.
///
/// `end` is how the read of `line` ended, if it had no line-feed. It only
/// matters when the line is empty.
pub fn classify(line: &[u8], end: Option<&ReadEnd>) -> Token {
    if line.is_empty() {
        match end {
            Some(ReadEnd::Eof) => return Token::Eof,
            Some(ReadEnd::Error(_)) => return Token::Error,
            None => {}
        }
    }

    if line.is_empty() || line == b"\n" {
        return Token::Empty;
    }

    if line[0] == b'#' {
        return Token::Comment;
    }

    let end = match line.iter().position(|&b| b == b' ' || b == b'\n') {
        Some(end) if line.last() == Some(&b'\n') => end,
        _ => return Token::Invalid,
    };

    std::str::from_utf8(&line[..end])
        .ok()
        .and_then(Token::from_keyword)
        .unwrap_or(Token::Invalid)
}

fn split_fields(line: &[u8]) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    String::from_utf8_lossy(line)
        .split(' ')
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn lexer(input: &str) -> Lexer<Cursor<Vec<u8>>> {
        Lexer::new(Cursor::new(input.as_bytes().to_vec()))
    }

    /// Reader that fails every read with the given kind.
    struct Failing(io::ErrorKind);

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "read failed"))
        }
    }

    #[test]
    fn test_classify() {
        let eof = || ReadEnd::Eof;
        let closed = || ReadEnd::Error(io::Error::from(io::ErrorKind::BrokenPipe));
        let truncated = || ReadEnd::Error(io::Error::from(io::ErrorKind::UnexpectedEof));

        let cases: Vec<(&str, Option<ReadEnd>, Token)> = vec![
            // Lines must have an LF
            ("data", None, Token::Invalid),
            ("data ", None, Token::Invalid),
            ("data arg1", None, Token::Invalid),
            ("data arg1 arg2", None, Token::Invalid),
            ("commit", Some(eof()), Token::Invalid),
            // Arguments are allowed
            ("data\n", None, Token::Data),
            ("data arg1\n", None, Token::Data),
            ("data arg1 arg2\n", None, Token::Data),
            // Unknown commands are invalid
            ("foo\n", None, Token::Invalid),
            (" commit\n", None, Token::Invalid),
            // Comments
            ("#", None, Token::Comment),
            ("#a", None, Token::Comment),
            ("#a\n", None, Token::Comment),
            ("# a", None, Token::Comment),
            ("# a\n", None, Token::Comment),
            // Errors are ignored if the line isn't empty
            ("\n", Some(eof()), Token::Empty),
            ("data\n", Some(eof()), Token::Data),
            ("data\n", Some(closed()), Token::Data),
            // Errors are reported when the line is empty
            ("", Some(eof()), Token::Eof),
            ("", Some(closed()), Token::Error),
            ("", Some(truncated()), Token::Error),
            ("", None, Token::Empty),
        ];

        for (i, (line, err, want)) in cases.iter().enumerate() {
            let got = classify(line.as_bytes(), err.as_ref());
            assert_eq!(got, *want, "[{i}] classify({line:?}, {err:?})");
        }
    }

    #[test]
    fn test_lex() {
        let mut l = lexer(
            "reset refs/heads/a
commit refs/heads/a
mark :1
author Some Guy <someguy@gmail.com.uk> 1393367434 -0700
committer Some Guy <someguy@gmail.com.uk> 1393367434 -0700
M 100644 e79c5e8f964493290a409888d5413a737e8e5dd5 test.txt

reset refs/heads/master
from :2

# a comment
tag c.Merge-to-a-1
#another comment
from :2
tagger Some Guy <someguy@gmail.com.uk> 1393367459 -0700

",
        );

        let want: Vec<(Token, Vec<&str>)> = vec![
            (Token::Reset, vec!["reset", "refs/heads/a"]),
            (Token::Commit, vec!["commit", "refs/heads/a"]),
            (Token::Mark, vec!["mark", ":1"]),
            (
                Token::Author,
                vec!["author", "Some", "Guy", "<someguy@gmail.com.uk>", "1393367434", "-0700"],
            ),
            (
                Token::Committer,
                vec!["committer", "Some", "Guy", "<someguy@gmail.com.uk>", "1393367434", "-0700"],
            ),
            (
                Token::Modify,
                vec!["M", "100644", "e79c5e8f964493290a409888d5413a737e8e5dd5", "test.txt"],
            ),
            (Token::Empty, vec![""]),
            (Token::Reset, vec!["reset", "refs/heads/master"]),
            (Token::From, vec!["from", ":2"]),
            (Token::Empty, vec![""]),
            (Token::Comment, vec!["#", "a", "comment"]),
            (Token::Tag, vec!["tag", "c.Merge-to-a-1"]),
            (Token::Comment, vec!["#another", "comment"]),
            (Token::From, vec!["from", ":2"]),
            (
                Token::Tagger,
                vec!["tagger", "Some", "Guy", "<someguy@gmail.com.uk>", "1393367459", "-0700"],
            ),
            (Token::Empty, vec![""]),
            (Token::Eof, vec![]),
        ];

        for (i, (tok, fields)) in want.iter().enumerate() {
            assert_eq!(l.token(), *tok, "[{i}] token");
            let got: Vec<&str> = l.fields().iter().map(String::as_str).collect();
            assert_eq!(got, *fields, "[{i}] fields");
            assert_eq!(l.line_number(), i + 1, "[{i}] line number");
            l.advance();
        }
    }

    #[test]
    fn test_line_keeps_line_feed() {
        let mut l = lexer("M 644 inline a.txt\nD b.txt");
        assert_eq!(l.line(), b"M 644 inline a.txt\n");
        assert_eq!(l.field(3), Some("a.txt"));
        assert_eq!(l.field(4), None);

        l.advance();
        // Last line without a line-feed
        assert_eq!(l.line(), b"D b.txt");
        assert_eq!(l.token(), Token::Invalid);
        assert!(matches!(l.read_end(), Some(ReadEnd::Eof)));
        assert!(l.error().is_none());
    }

    #[test]
    fn test_empty_input() {
        let l = lexer("");
        assert_eq!(l.token(), Token::Eof);
        assert_eq!(l.line_number(), 1);
        assert!(l.fields().is_empty());
    }

    #[test]
    fn test_advance_past_eof() {
        let mut l = lexer("done\n");
        assert_eq!(l.token(), Token::Done);
        l.advance();
        assert_eq!(l.token(), Token::Eof);
        l.advance();
        assert_eq!(l.token(), Token::Eof);
        assert_eq!(l.line_number(), 3);
    }

    #[test]
    fn test_read_error() {
        let mut l = Lexer::from_reader(Failing(io::ErrorKind::ConnectionReset));
        assert_eq!(l.token(), Token::Error);
        let err = l.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(l.error().is_none());
    }

    #[test]
    fn test_unexpected_eof_from_reader_is_an_error() {
        let input = Cursor::new(b"commit refs/heads/a\n".to_vec())
            .chain(Failing(io::ErrorKind::UnexpectedEof));
        let mut l = Lexer::from_reader(input);
        assert_eq!(l.token(), Token::Commit);

        l.advance();
        assert_eq!(l.token(), Token::Error);
        assert_eq!(l.line_number(), 2);
        assert_eq!(l.error().map(io::Error::kind), Some(io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_invalid_utf8_keyword() {
        let mut l = Lexer::new(Cursor::new(b"\xff\xfe x\n".to_vec()));
        assert_eq!(l.token(), Token::Invalid);
        l.advance();
        assert_eq!(l.token(), Token::Eof);
    }
}
