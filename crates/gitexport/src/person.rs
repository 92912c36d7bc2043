//! Author, committer and tagger identities.

use crate::token::Token;
use crate::{Result, StreamError};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use std::fmt;
use std::io::Write;

/// Layout of the `rfc2822` date format after the weekday name, e.g.
/// `Jan 2 15:04:05 2006 -0700`.
const RFC2822_FORMAT: &str = "%b %d %H:%M:%S %Y %z";

/// Weekday names accepted at the start of an `rfc2822` date.
///
/// The name must be well formed but is not checked against the date.
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// An identity with a point in time.
///
/// The offset of `when` is kept for rendering. Two persons compare equal
/// when they name the same instant, whatever the offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Name, absent when the line starts with the email.
    pub name: Option<String>,
    /// Email including its angle brackets, e.g. `<dev@example.com>`.
    pub email: String,
    /// Time of the action.
    pub when: DateTime<FixedOffset>,
}

impl Person {
    /// Creates a person without a name.
    pub fn new(email: impl Into<String>, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: None,
            email: email.into(),
            when,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses the fields of a person line, starting after the command keyword.
    ///
    /// `fields[0]` is the keyword itself. `line` is only used for errors.
    pub(crate) fn parse(fields: &[String], token: Token, line: usize) -> Result<Self> {
        let email_idx = fields
            .iter()
            .skip(1)
            .position(|f| f.starts_with('<'))
            .map(|i| i + 1)
            .ok_or(StreamError::MissingEmail { line, token })?;

        let name = (email_idx > 1).then(|| fields[1..email_idx].join(" "));
        let when = parse_when(&fields[email_idx + 1..], token, line)?;

        Ok(Self {
            name,
            email: fields[email_idx].clone(),
            when,
        })
    }

    /// Writes the person as it follows a command keyword, including the line-feed.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let rendered = format!("{}\n", self);
        writer.write_all(rendered.as_bytes())?;
        Ok(rendered.len())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        write!(
            f,
            "{} {} {}",
            self.email,
            self.when.timestamp(),
            self.when.format("%z")
        )
    }
}

/// Parses a date in one of the `now`, `raw` or `rfc2822` formats.
fn parse_when(fields: &[String], token: Token, line: usize) -> Result<DateTime<FixedOffset>> {
    let first = fields
        .first()
        .filter(|f| !f.is_empty())
        .ok_or(StreamError::MissingTimestamp { line, token })?;

    if first == "now" {
        return Ok(Local::now().fixed_offset());
    }

    if let Some(when) = parse_raw(first, fields.get(1).map(String::as_str)) {
        return Ok(when);
    }

    let value = fields.join(" ");
    let invalid = |source| StreamError::InvalidTimestamp {
        line,
        value: value.clone(),
        source,
    };
    if !WEEKDAYS.iter().any(|day| first.eq_ignore_ascii_case(day)) {
        return Err(invalid(None));
    }
    DateTime::parse_from_str(&fields[1..].join(" "), RFC2822_FORMAT)
        .map_err(|source| invalid(Some(source)))
}

/// Parses `<seconds> <offset>`.
///
/// The offset does not shift the instant. A missing or malformed offset
/// falls back to UTC.
fn parse_raw(seconds: &str, offset: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let digits = seconds.strip_prefix(['+', '-']).unwrap_or(seconds);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: i64 = seconds.parse().ok()?;
    let utc = DateTime::from_timestamp(seconds, 0)?;

    let offset = offset.and_then(parse_offset).unwrap_or_else(|| Utc.fix());
    Some(utc.with_timezone(&offset))
}

/// Parses a `±HHMM` offset.
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
