//! Argument scanning shared by the command parsers.
//!
//! Arguments are whitespace separated, except a trailing text payload which
//! runs from the first `"` to the last one so it may contain spaces and
//! quotes of its own.

use quill_buffer::Position;

use crate::command::LineRange;
use crate::{CoreError, CoreResult};

/// The literal two-character marker that stands for a line break in a payload.
pub(crate) const NEWLINE_MARKER: &str = "\\n";

/// Splits off the first whitespace-separated word.
///
/// Returns `None` when `input` holds nothing but whitespace.
pub(crate) fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((&input[..end], input[end..].trim_start()))
}

/// Strips the command keyword, returning the remaining arguments.
pub(crate) fn keyword<'a>(raw: &'a str, name: &str) -> CoreResult<&'a str> {
    match next_token(raw) {
        Some((word, rest)) if word == name => Ok(rest),
        Some((word, _)) => Err(CoreError::parse(format!(
            "expected `{name}`, found `{word}`"
        ))),
        None => Err(CoreError::parse(format!("expected `{name}`"))),
    }
}

/// Requires that nothing but whitespace is left.
pub(crate) fn end(rest: &str) -> CoreResult<()> {
    match next_token(rest) {
        None => Ok(()),
        Some((word, _)) => Err(CoreError::parse(format!("unexpected argument `{word}`"))),
    }
}

/// Reads a `"..."` payload that must make up the rest of the input.
pub(crate) fn quoted(rest: &str) -> CoreResult<&str> {
    let rest = rest.trim();
    if rest.len() < 2 || !rest.starts_with('"') || !rest.ends_with('"') {
        return Err(CoreError::parse("text must be enclosed in double quotes"));
    }
    Ok(&rest[1..rest.len() - 1])
}

/// Turns each literal `\n` marker into a real line break.
pub(crate) fn expand_newlines(text: &str) -> String {
    text.replace(NEWLINE_MARKER, "\n")
}

fn number(token: &str, what: &str) -> CoreResult<usize> {
    token
        .parse()
        .map_err(|_| CoreError::parse(format!("invalid {what} `{token}`")))
}

fn pair<'a>(token: &'a str, what: &str) -> CoreResult<(&'a str, &'a str)> {
    token
        .split_once(':')
        .ok_or_else(|| CoreError::parse(format!("expected {what} as `<a>:<b>`, found `{token}`")))
}

/// Parses `<line>:<column>`.
pub(crate) fn position(token: &str) -> CoreResult<Position> {
    let (line, column) = pair(token, "position")?;
    Ok(Position::new(number(line, "line")?, number(column, "column")?))
}

/// Parses a character count.
pub(crate) fn length(token: &str) -> CoreResult<usize> {
    number(token, "length")
}

/// Parses `<start>:<end>`.
pub(crate) fn line_range(token: &str) -> CoreResult<LineRange> {
    let (start, end) = pair(token, "range")?;
    Ok(LineRange {
        start: number(start, "start line")?,
        end: number(end, "end line")?,
    })
}

/// Takes the next token or fails naming what was expected.
pub(crate) fn required<'a>(rest: &'a str, what: &str) -> CoreResult<(&'a str, &'a str)> {
    next_token(rest).ok_or_else(|| CoreError::parse(format!("missing {what}")))
}
