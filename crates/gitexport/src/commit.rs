//! Commit records and their wire form.
//!
//! See: https://git-scm.com/docs/git-fast-import#_commit

use crate::person::Person;
use crate::token::Token;
use crate::Result;
use std::fmt;
use std::io::Write;

/// Kind of a file command, keyed by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommandKind {
    /// `M`: filemodify.
    Modify,
    /// `D`: filedelete.
    Delete,
    /// `C`: filecopy.
    Copy,
    /// `R`: filerename.
    Rename,
    /// `deleteall`: filedeleteall.
    DeleteAll,
    /// `N`: notemodify.
    Note,
}

impl FileCommandKind {
    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Modify => Some(Self::Modify),
            Token::Delete => Some(Self::Delete),
            Token::Copy => Some(Self::Copy),
            Token::Rename => Some(Self::Rename),
            Token::DeleteAll => Some(Self::DeleteAll),
            Token::Note => Some(Self::Note),
            _ => None,
        }
    }
}

/// A file command in unparsed form, including the final line-feed.
///
/// One of filemodify, filedelete, filecopy, filerename, filedeleteall or
/// notemodify. The bytes are kept verbatim so they render back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommand(Vec<u8>);

impl FileCommand {
    /// Wraps a raw command line. A missing line-feed is appended.
    pub fn new(line: impl Into<Vec<u8>>) -> Self {
        let mut line = line.into();
        if line.last() != Some(&b'\n') {
            line.push(b'\n');
        }
        Self(line)
    }

    /// Returns the raw line.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the line as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns the kind of command, or `None` for an unknown keyword.
    pub fn kind(&self) -> Option<FileCommandKind> {
        let end = self
            .0
            .iter()
            .position(|&b| b == b' ' || b == b'\n')
            .unwrap_or(self.0.len());
        std::str::from_utf8(&self.0[..end])
            .ok()
            .and_then(Token::from_keyword)
            .and_then(FileCommandKind::from_token)
    }
}

impl From<&str> for FileCommand {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl fmt::Display for FileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A `commit` record.
///
/// Fields appear on the wire in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Branch or ref the commit is made on.
    pub reference: String,
    /// Mark assigned to this commit.
    pub mark: Option<u64>,
    pub author: Option<Person>,
    pub committer: Person,
    /// Commit message, verbatim.
    pub message: Vec<u8>,
    /// First parent, a ref, mark (`:<n>`) or object id.
    pub from: Option<String>,
    /// Additional parents.
    pub merge: Vec<String>,
    pub file_commands: Vec<FileCommand>,
}

impl Commit {
    /// Creates a commit with only the required fields.
    pub fn new(reference: impl Into<String>, committer: Person, message: impl Into<Vec<u8>>) -> Self {
        Self {
            reference: reference.into(),
            mark: None,
            author: None,
            committer,
            message: message.into(),
            from: None,
            merge: Vec::new(),
            file_commands: Vec::new(),
        }
    }

    /// Returns the message as text, if it is valid UTF-8.
    pub fn message_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.message).ok()
    }

    /// Writes the commit in stream form and returns the number of bytes written.
    ///
    /// The record is terminated by an empty line.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let buf = self.to_bytes();
        writer.write_all(&buf)?;
        Ok(buf.len())
    }

    /// Renders the commit into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.message.len() + 256);

        buf.extend_from_slice(format!("commit {}\n", self.reference).as_bytes());
        if let Some(mark) = self.mark {
            buf.extend_from_slice(format!("mark :{}\n", mark).as_bytes());
        }
        if let Some(author) = &self.author {
            buf.extend_from_slice(format!("author {}\n", author).as_bytes());
        }
        buf.extend_from_slice(format!("committer {}\n", self.committer).as_bytes());

        buf.extend_from_slice(format!("data {}\n", self.message.len()).as_bytes());
        buf.extend_from_slice(&self.message);

        if let Some(from) = &self.from {
            buf.extend_from_slice(format!("from {}\n", from).as_bytes());
        }
        for merge in &self.merge {
            buf.extend_from_slice(format!("merge {}\n", merge).as_bytes());
        }
        for command in &self.file_commands {
            buf.extend_from_slice(command.as_bytes());
        }
        buf.push(b'\n');

        buf
    }
}
