//! End-to-end tests over multi-record export streams.
//!
//! Streams mix commits with records this crate does not parse. Callers
//! skip those by hand through the lexer.

use std::io::Cursor;

use gitexport::{Commit, FileCommandKind, Lexer, Parser, Person, StreamError, Token};

const STREAM: &str = "reset refs/heads/a
commit refs/heads/a
mark :1
author Patrick Higgins <patrick.allen.higgins@gmail.com> 1393367434 -0700
committer Patrick Higgins <patrick.allen.higgins@gmail.com> 1393367434 -0700
data 8
initial
M 100644 e79c5e8f964493290a409888d5413a737e8e5dd5 test.txt

commit refs/heads/master
mark :4
author Patrick Higgins <patrick.allen.higgins@gmail.com> 1393367459 -0700
committer Patrick Higgins <patrick.allen.higgins@gmail.com> 1393367459 -0700
data 15
Merge a into b
from :1
merge :2
merge :3
M 100644 :5 merged.txt

reset refs/heads/master
from :4

tag c.Merge-to-a-1
from :2
tagger Patrick Higgins <patrick.allen.higgins@gmail.com> 1393367459 -0700
data 15
c.Merge-to-a-1

";

fn parser(input: &str) -> Parser<Cursor<Vec<u8>>> {
    Parser::new(Lexer::new(Cursor::new(input.as_bytes().to_vec())))
}

/// Skips an unsupported record up to the next empty line or record.
fn skip_record<R: std::io::BufRead>(lexer: &mut Lexer<R>) {
    lexer.advance();
    while !lexer.token().is_record()
        && !matches!(lexer.token(), Token::Empty | Token::Eof | Token::Error)
    {
        if lexer.token() == Token::Data {
            lexer.consume_data().unwrap();
        } else {
            lexer.advance();
        }
    }
}

/// Collects all commits, skipping other records.
fn collect_commits(input: &str) -> Vec<Commit> {
    let mut p = parser(input);
    let mut commits = Vec::new();
    loop {
        match p.next_commit() {
            Ok(Some(c)) => commits.push(c),
            Ok(None) => break,
            Err(StreamError::Unsupported { .. }) => skip_record(p.lexer_mut()),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    commits
}

#[test]
fn test_stream_commits() {
    let commits = collect_commits(STREAM);
    assert_eq!(commits.len(), 2);

    let merge = &commits[1];
    assert_eq!(merge.reference, "refs/heads/master");
    assert_eq!(merge.mark, Some(4));
    assert_eq!(merge.from.as_deref(), Some(":1"));
    assert_eq!(merge.merge, vec![":2", ":3"]);
    assert_eq!(merge.file_commands.len(), 1);
    assert_eq!(
        merge.file_commands[0].as_bytes(),
        b"M 100644 :5 merged.txt\n"
    );
    assert_eq!(
        merge.file_commands[0].kind(),
        Some(FileCommandKind::Modify)
    );
    assert_eq!(merge.message_str(), Some("Merge a into b\n"));
}

#[test]
fn test_stream_rewrite_is_canonical() {
    let commits = collect_commits(STREAM);

    let mut out = Vec::new();
    for c in &commits {
        c.write_to(&mut out).unwrap();
    }

    // The rendered commits are byte-identical to their source text
    let text = String::from_utf8(out).unwrap();
    let first = STREAM.find("commit refs/heads/a").unwrap();
    let end = STREAM.find("reset refs/heads/master").unwrap();
    assert_eq!(text, &STREAM[first..end]);

    // And parse back to the same records
    assert_eq!(collect_commits(&text), commits);
}

#[test]
fn test_rfc2822_dates_render_as_raw() {
    let input = "commit refs/heads/main
committer Some Guy <guy@example.com> Mon Jan 2 15:04:05 2006 -0700
data 3
hi

";
    let c = parser(input).commit().unwrap();
    let text = String::from_utf8(c.to_bytes()).unwrap();
    assert!(text.contains("committer Some Guy <guy@example.com> 1136239445 -0700\n"));
}

#[test]
fn test_error_reports_line_number() {
    let input = "commit refs/heads/a
committer <a@b.c> 0 +0000
data 0

commit refs/heads/b
author <a@b.c> 0 +0000
data 0
";
    let mut p = parser(input);
    assert!(p.next_commit().unwrap().is_some());

    let err = p.next_commit().unwrap_err();
    assert_eq!(err.line(), Some(7));
    assert_eq!(err.to_string(), "line 7: missing committer");
}

#[test]
fn test_programmatic_commit_roundtrip() {
    let when = chrono::DateTime::parse_from_rfc2822("Tue, 25 Feb 2014 15:30:34 -0700").unwrap();
    let mut c = Commit::new(
        "refs/heads/topic",
        Person::new("<dev@example.com>", when).with_name("Dev Eloper"),
        "multi\nline\nmessage\n",
    );
    c.mark = Some(7);
    c.author = Some(Person::new("<other@example.com>", when));
    c.from = Some(":6".to_string());
    c.file_commands = vec!["deleteall".into(), "M 100644 :3 README".into()];

    let parsed = Parser::from_reader(c.to_bytes().as_slice())
        .commit()
        .unwrap();
    assert_eq!(parsed, c);
}
