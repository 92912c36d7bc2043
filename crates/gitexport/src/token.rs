//! Token kinds of the export stream.
//!
//! A line's token is determined by its first space-separated field alone.

use std::fmt;

/// The kind of a single line in an export stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A line with an unknown command or without a terminating line-feed.
    Invalid,
    /// The underlying reader failed without producing any bytes.
    Error,
    /// End of stream.
    Eof,
    /// An empty line.
    Empty,
    /// A line starting with `#`.
    Comment,
    Commit,
    Tag,
    Reset,
    Blob,
    Checkpoint,
    Progress,
    Done,
    CatBlob,
    Ls,
    Feature,
    Option,
    Mark,
    Author,
    Committer,
    Data,
    From,
    Merge,
    /// `C`: filecopy.
    Copy,
    /// `D`: filedelete.
    Delete,
    /// `M`: filemodify.
    Modify,
    /// `N`: notemodify.
    Note,
    /// `R`: filerename.
    Rename,
    /// `deleteall`: filedeleteall.
    DeleteAll,
    Tagger,
}

/// Keyword table used for classification.
const KEYWORDS: &[(&str, Token)] = &[
    ("commit", Token::Commit),
    ("tag", Token::Tag),
    ("reset", Token::Reset),
    ("blob", Token::Blob),
    ("checkpoint", Token::Checkpoint),
    ("progress", Token::Progress),
    ("done", Token::Done),
    ("cat-blob", Token::CatBlob),
    ("ls", Token::Ls),
    ("feature", Token::Feature),
    ("option", Token::Option),
    ("mark", Token::Mark),
    ("author", Token::Author),
    ("committer", Token::Committer),
    ("data", Token::Data),
    ("from", Token::From),
    ("merge", Token::Merge),
    ("C", Token::Copy),
    ("D", Token::Delete),
    ("M", Token::Modify),
    ("N", Token::Note),
    ("R", Token::Rename),
    ("deleteall", Token::DeleteAll),
    ("tagger", Token::Tagger),
];

impl Token {
    /// Looks up a command keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, tok)| *tok)
    }

    /// Returns the keyword, or a bracketed name for synthetic kinds.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "<INVALID>",
            Self::Error => "<ERROR>",
            Self::Eof => "<EOF>",
            Self::Empty => "<EMPTY>",
            Self::Comment => "#comment",
            Self::Commit => "commit",
            Self::Tag => "tag",
            Self::Reset => "reset",
            Self::Blob => "blob",
            Self::Checkpoint => "checkpoint",
            Self::Progress => "progress",
            Self::Done => "done",
            Self::CatBlob => "cat-blob",
            Self::Ls => "ls",
            Self::Feature => "feature",
            Self::Option => "option",
            Self::Mark => "mark",
            Self::Author => "author",
            Self::Committer => "committer",
            Self::Data => "data",
            Self::From => "from",
            Self::Merge => "merge",
            Self::Copy => "C",
            Self::Delete => "D",
            Self::Modify => "M",
            Self::Note => "N",
            Self::Rename => "R",
            Self::DeleteAll => "deleteall",
            Self::Tagger => "tagger",
        }
    }

    /// Returns true for the commands that may follow a commit's message.
    pub fn is_file_command(&self) -> bool {
        matches!(
            self,
            Self::Modify | Self::Delete | Self::Copy | Self::Rename | Self::DeleteAll | Self::Note
        )
    }

    /// Returns true for keywords that start a top-level record.
    pub fn is_record(&self) -> bool {
        matches!(
            self,
            Self::Commit
                | Self::Tag
                | Self::Reset
                | Self::Blob
                | Self::Checkpoint
                | Self::Progress
                | Self::Done
                | Self::CatBlob
                | Self::Ls
                | Self::Feature
                | Self::Option
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
