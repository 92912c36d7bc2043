//! CLI command implementations.

use anyhow::{Context, Result};
use gitexport::{Commit, Lexer, Parser, Person, StreamError, Token};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Summary of a commit for display.
#[derive(Debug, Serialize)]
pub struct CommitSummary {
    pub reference: String,
    pub mark: Option<u64>,
    pub author: Option<PersonSummary>,
    pub committer: PersonSummary,
    pub message: String,
    pub from: Option<String>,
    pub merge: Vec<String>,
    pub file_commands: usize,
}

/// Summary of a person for display.
#[derive(Debug, Serialize)]
pub struct PersonSummary {
    pub name: Option<String>,
    pub email: String,
    pub when: String,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            email: person.email.clone(),
            when: person.when.to_rfc3339(),
        }
    }
}

impl From<&Commit> for CommitSummary {
    fn from(commit: &Commit) -> Self {
        Self {
            reference: commit.reference.clone(),
            mark: commit.mark,
            author: commit.author.as_ref().map(PersonSummary::from),
            committer: PersonSummary::from(&commit.committer),
            message: String::from_utf8_lossy(&commit.message).into_owned(),
            from: commit.from.clone(),
            merge: commit.merge.clone(),
            file_commands: commit.file_commands.len(),
        }
    }
}

/// Print the token and fields of every line.
pub fn tokens(input: Option<&Path>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_tokens(open_input(input)?, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Parse every commit and print a summary.
pub fn commits(input: Option<&Path>, json: bool, skip_unsupported: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_summaries(open_input(input)?, &mut out, json, skip_unsupported)?;
    out.flush()?;
    Ok(())
}

/// Parse every commit and write it back in canonical form.
pub fn rewrite(input: Option<&Path>, output: Option<&Path>, skip_unsupported: bool) -> Result<()> {
    let mut out = open_output(output)?;
    let count = rewrite_stream(open_input(input)?, &mut out, skip_unsupported)?;
    out.flush()?;
    tracing::info!(commits = count, "Rewrote stream");
    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn write_tokens<R: BufRead, W: Write>(input: R, out: &mut W) -> Result<()> {
    let mut lexer = Lexer::new(input);
    loop {
        let line = lexer.line_number();
        match lexer.token() {
            Token::Eof => return Ok(()),
            Token::Error => {
                let source = lexer
                    .take_error()
                    .unwrap_or_else(|| io::Error::other("read failed"));
                return Err(StreamError::Stream { line, source }.into());
            }
            Token::Data => {
                let fields = lexer.fields().join(" ");
                let data = lexer.consume_data()?;
                writeln!(out, "{line}\tdata\t{fields}\t({} bytes)", data.len())?;
            }
            token => {
                writeln!(out, "{line}\t{token}\t{}", lexer.fields().join(" "))?;
                lexer.advance();
            }
        }
    }
}

fn write_summaries<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    json: bool,
    skip_unsupported: bool,
) -> Result<()> {
    let mut summaries = Vec::new();
    for_each_commit(input, skip_unsupported, |commit| {
        let summary = CommitSummary::from(&commit);
        if !json {
            let subject = summary.message.lines().next().unwrap_or_default();
            let mark = summary
                .mark
                .map_or_else(|| "-".to_string(), |m| format!(":{m}"));
            writeln!(out, "{mark}\t{}\t{subject}", summary.reference)?;
        }
        summaries.push(summary);
        Ok(())
    })?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &summaries)?;
        writeln!(out)?;
    }
    Ok(())
}

fn rewrite_stream<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    skip_unsupported: bool,
) -> Result<usize> {
    for_each_commit(input, skip_unsupported, |commit| {
        commit.write_to(out)?;
        Ok(())
    })
}

/// Parses the commits of a stream in order, stopping at the first error.
fn for_each_commit<R: BufRead>(
    input: R,
    skip_unsupported: bool,
    mut f: impl FnMut(Commit) -> Result<()>,
) -> Result<usize> {
    let mut parser = Parser::new(Lexer::new(input));
    let mut count = 0;
    loop {
        match parser.next_commit() {
            Ok(Some(commit)) => {
                f(commit)?;
                count += 1;
            }
            Ok(None) => return Ok(count),
            Err(StreamError::Unsupported { line, token }) if skip_unsupported => {
                tracing::info!(line, %token, "Skipping unsupported record");
                skip_record(parser.lexer_mut())?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Advances past the current record and its data blocks.
fn skip_record<R: BufRead>(lexer: &mut Lexer<R>) -> gitexport::Result<()> {
    lexer.advance();
    while !lexer.token().is_record()
        && !matches!(lexer.token(), Token::Empty | Token::Eof | Token::Error)
    {
        if lexer.token() == Token::Data {
            lexer.consume_data()?;
        } else {
            lexer.advance();
        }
    }
    Ok(())
}
