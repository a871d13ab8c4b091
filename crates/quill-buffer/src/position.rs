//! Line/column positions and their validation.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` wraps a line/column pair instead of passing `(usize, usize)`
//! around, so line and column can't be swapped by accident.
//!
//! Both coordinates are 1-indexed, matching what the user types. A column
//! names the gap *before* the character at that index, so a line of `n`
//! characters has columns `1..=n + 1` and `n + 1` means end-of-line.

use crate::{BufferError, BufferResult};

/// A position in the buffer (line and column, both 1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first column of the first line.
    pub const START: Position = Position { line: 1, column: 1 };

    /// 0-indexed line, for indexing into the line vector.
    pub(crate) fn line_index(&self) -> usize {
        self.line.saturating_sub(1)
    }

    /// 0-indexed column, counted in characters.
    pub(crate) fn column_index(&self) -> usize {
        self.column.saturating_sub(1)
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.column.cmp(&other.column),
            other => other,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Checks that `line` addresses an existing line.
///
/// An empty document still accepts line 1: it stands for the implicit,
/// not yet materialised, first line.
pub fn validate_line(lines: &[String], line: usize) -> BufferResult<()> {
    if line == 0 || line > lines.len().max(1) {
        return Err(BufferError::InvalidLine {
            line,
            line_count: lines.len(),
        });
    }
    Ok(())
}

/// Checks that `position` addresses a gap on its line.
///
/// Returns the length of the target line in characters.
pub fn validate_column(lines: &[String], position: Position) -> BufferResult<usize> {
    validate_line(lines, position.line)?;

    let line_len = lines
        .get(position.line_index())
        .map_or(0, |line| line.chars().count());

    if position.column == 0 || position.column > line_len + 1 {
        return Err(BufferError::InvalidColumn {
            line: position.line,
            column: position.column,
            line_len,
        });
    }
    Ok(line_len)
}

/// Checks that the span `[column, column + length)` fits on one existing line.
///
/// Spans never cross line boundaries, and there is nothing to span on the
/// implicit line of an empty document.
pub fn validate_span(lines: &[String], position: Position, length: usize) -> BufferResult<()> {
    if lines.is_empty() {
        return Err(BufferError::InvalidLine {
            line: position.line,
            line_count: 0,
        });
    }

    let line_len = validate_column(lines, position)?;

    let fits = position
        .column_index()
        .checked_add(length)
        .is_some_and(|end| end <= line_len);
    if !fits {
        return Err(BufferError::SpanExceedsLine {
            position,
            length,
            line_len,
        });
    }
    Ok(())
}

/// Converts a 0-indexed character column into a byte offset within `text`.
///
/// The column one past the last character maps to `text.len()`.
pub(crate) fn byte_offset(text: &str, column_index: usize) -> Option<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .nth(column_index)
}
