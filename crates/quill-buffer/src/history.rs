//! Undo/redo history management.
//!
//! ## Learning: The Command Pattern
//!
//! Each applied edit is stored as a record that can be:
//! - Reverted (undo)
//! - Re-applied (redo)
//!
//! A record is built only after its edit has been validated, so it never
//! carries half-initialised fields. It holds exactly what reversal needs:
//! the removed text for a delete, the original line for an insert, and so on.
//!
//! History is linear: recording a new edit discards everything on the redo
//! stack.

use std::collections::VecDeque;

use crate::position::byte_offset;
use crate::{BufferError, BufferResult, Position};

/// Default number of edits kept on the undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// A single applied edit, with the data needed to reverse it.
///
/// ## Learning: Enums with Data
///
/// Every variant carries different data, and `match` forces `apply` and
/// `revert` to handle each one. Adding a variant is a compile error until
/// both directions know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// A new final line was added.
    Append { text: String },

    /// `text` was inserted at `position`; embedded `\n`s split the line.
    Insert {
        position: Position,
        text: String,
        /// The target line before the insert, `None` if the document was empty.
        original: Option<String>,
        /// Number of lines the target line became.
        produced: usize,
    },

    /// `removed` was cut out of the line at `position`.
    Delete { position: Position, removed: String },

    /// `removed` was swapped for `text` at `position`.
    Replace {
        position: Position,
        removed: String,
        text: String,
    },
}

impl Edit {
    /// Short name of the edit kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Edit::Append { .. } => "append",
            Edit::Insert { .. } => "insert",
            Edit::Delete { .. } => "delete",
            Edit::Replace { .. } => "replace",
        }
    }

    /// Where the edit happened. Appends report the line they created.
    pub fn position(&self, lines: &[String]) -> Position {
        match self {
            Edit::Append { .. } => Position::new(lines.len().max(1), 1),
            Edit::Insert { position, .. }
            | Edit::Delete { position, .. }
            | Edit::Replace { position, .. } => *position,
        }
    }

    fn stale(&self, lines: &[String]) -> BufferError {
        BufferError::StaleEdit {
            kind: self.kind(),
            position: self.position(lines),
        }
    }

    /// Applies the forward mutation.
    ///
    /// Coordinates are not re-validated against the edit's original
    /// preconditions; they only have to land inside the current lines.
    /// Otherwise `lines` is left untouched and `StaleEdit` is returned.
    pub fn apply(&self, lines: &mut Vec<String>) -> BufferResult<()> {
        match self {
            Edit::Append { text } => {
                lines.push(text.clone());
            }
            Edit::Insert { position, text, .. } => {
                let idx = position.line_index();
                let target = if lines.is_empty() && idx == 0 {
                    ""
                } else {
                    lines.get(idx).ok_or_else(|| self.stale(lines))?
                };
                let at = byte_offset(target, position.column_index())
                    .ok_or_else(|| self.stale(lines))?;
                let replacement = split_insert(target, at, text);

                if lines.is_empty() {
                    *lines = replacement;
                } else {
                    lines.splice(idx..=idx, replacement);
                }
            }
            Edit::Delete { position, removed } => {
                let range = span_bytes(lines, *position, removed.chars().count())
                    .ok_or_else(|| self.stale(lines))?;
                lines[position.line_index()].replace_range(range, "");
            }
            Edit::Replace {
                position,
                removed,
                text,
            } => {
                let range = span_bytes(lines, *position, removed.chars().count())
                    .ok_or_else(|| self.stale(lines))?;
                lines[position.line_index()].replace_range(range, text);
            }
        }
        Ok(())
    }

    /// Reverses the mutation using the captured record.
    pub fn revert(&self, lines: &mut Vec<String>) -> BufferResult<()> {
        match self {
            // Removes whatever is last now; tail identity is not checked.
            Edit::Append { .. } => {
                if lines.pop().is_none() {
                    return Err(self.stale(lines));
                }
            }
            Edit::Insert {
                position,
                original,
                produced,
                ..
            } => {
                let idx = position.line_index();
                let end = idx + produced;
                if end > lines.len() {
                    return Err(self.stale(lines));
                }
                match original {
                    Some(line) => {
                        lines.splice(idx..end, std::iter::once(line.clone()));
                    }
                    None => {
                        lines.drain(idx..end);
                    }
                }
            }
            Edit::Delete { position, removed } => {
                let at = span_bytes(lines, *position, 0).ok_or_else(|| self.stale(lines))?;
                lines[position.line_index()].insert_str(at.start, removed);
            }
            Edit::Replace {
                position,
                removed,
                text,
            } => {
                let range = span_bytes(lines, *position, text.chars().count())
                    .ok_or_else(|| self.stale(lines))?;
                lines[position.line_index()].replace_range(range, removed);
            }
        }
        Ok(())
    }
}

/// Splits `target` at byte `at` and threads `text`'s segments between the halves.
///
/// `"ab"` split at 1 with `"x\ny"` gives `["ax", "yb"]`; a single segment
/// keeps the line count unchanged.
fn split_insert(target: &str, at: usize, text: &str) -> Vec<String> {
    let (before, after) = target.split_at(at);
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

    if let Some(first) = lines.first_mut() {
        first.insert_str(0, before);
    }
    if let Some(last) = lines.last_mut() {
        last.push_str(after);
    }
    lines
}

/// Byte range of `length` characters starting at `position`, if it fits.
fn span_bytes(
    lines: &[String],
    position: Position,
    length: usize,
) -> Option<std::ops::Range<usize>> {
    let line = lines.get(position.line_index())?;
    let start = byte_offset(line, position.column_index())?;
    let end = byte_offset(line, position.column_index().checked_add(length)?)?;
    Some(start..end)
}

/// Manages the undo and redo stacks.
///
/// ## Design Decisions
///
/// 1. **Bounded history**: the oldest edits fall off once `max_size` is hit
/// 2. **Linear history**: recording a new edit clears the redo stack
/// 3. **Move, don't copy**: undo/redo move a record between stacks, so the
///    two stacks never share an entry
///
/// ## Learning: VecDeque
///
/// We use `VecDeque` for the undo stack because we need efficient:
/// - Push to back (new edits)
/// - Pop from front (when at capacity)
/// - Pop from back (for undo)
#[derive(Debug, Clone)]
pub struct History {
    /// Applied edits, most recent last
    undo_stack: VecDeque<Edit>,
    /// Undone edits, most recent last
    redo_stack: Vec<Edit>,
    /// Maximum number of edits to keep
    max_size: usize,
}

impl History {
    /// Creates a new history with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Records a freshly applied edit.
    ///
    /// Clears the redo stack (can't redo after a new edit).
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();
        self.undo_stack.push_back(edit);
        self.enforce_capacity();
    }

    /// The edit the next undo would revert.
    pub fn last_undo(&self) -> Option<&Edit> {
        self.undo_stack.back()
    }

    /// The edit the next redo would re-apply.
    pub fn last_redo(&self) -> Option<&Edit> {
        self.redo_stack.last()
    }

    /// Moves the top undo entry onto the redo stack.
    pub(crate) fn shift_to_redo(&mut self) {
        if let Some(edit) = self.undo_stack.pop_back() {
            self.redo_stack.push(edit);
        }
    }

    /// Moves the top redo entry back onto the undo stack.
    pub(crate) fn shift_to_undo(&mut self) {
        if let Some(edit) = self.redo_stack.pop() {
            self.undo_stack.push_back(edit);
            self.enforce_capacity();
        }
    }

    /// Changes the capacity, dropping the oldest edits if needed.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Returns the number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Iterates the undo stack, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &Edit> {
        self.undo_stack.iter()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_insert() {
        assert_eq!(split_insert("ab", 1, "x"), ["axb"]);
        assert_eq!(split_insert("ab", 1, "x\ny"), ["ax", "yb"]);
        assert_eq!(split_insert("ab", 2, "\nmid\n"), ["ab", "mid", ""]);
        assert_eq!(split_insert("", 0, "only"), ["only"]);
    }

    #[test]
    fn test_insert_apply_and_revert() {
        let mut doc = lines(&["Hello World"]);
        let edit = Edit::Insert {
            position: Position::new(1, 6),
            text: "\nNew Line\nAnother".to_string(),
            original: Some("Hello World".to_string()),
            produced: 3,
        };

        edit.apply(&mut doc).unwrap();
        assert_eq!(doc, ["Hello", "New Line", "Another World"]);

        edit.revert(&mut doc).unwrap();
        assert_eq!(doc, ["Hello World"]);
    }

    #[test]
    fn test_insert_into_empty_document_reverts_to_empty() {
        let mut doc = Vec::new();
        let edit = Edit::Insert {
            position: Position::START,
            text: "a\nb".to_string(),
            original: None,
            produced: 2,
        };

        edit.apply(&mut doc).unwrap();
        assert_eq!(doc, ["a", "b"]);

        edit.revert(&mut doc).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_replace_revert_handles_length_delta() {
        let mut doc = lines(&["Hello"]);
        let edit = Edit::Replace {
            position: Position::START,
            removed: "He".to_string(),
            text: "Hi There".to_string(),
        };

        edit.apply(&mut doc).unwrap();
        assert_eq!(doc, ["Hi Therello"]);

        edit.revert(&mut doc).unwrap();
        assert_eq!(doc, ["Hello"]);
    }

    #[test]
    fn test_span_bytes_overflow() {
        let doc = lines(&["Hello"]);
        assert_eq!(span_bytes(&doc, Position::new(1, 2), 2), Some(1..3));
        assert_eq!(span_bytes(&doc, Position::new(1, 2), usize::MAX), None);
    }

    #[test]
    fn test_stale_edit_leaves_lines_untouched() {
        let mut doc = lines(&["Hi"]);
        let edit = Edit::Delete {
            position: Position::new(1, 2),
            removed: "ello".to_string(),
        };

        let err = edit.apply(&mut doc).unwrap_err();
        assert!(matches!(err, BufferError::StaleEdit { kind: "delete", .. }));
        assert_eq!(doc, ["Hi"]);

        let mut empty = Vec::new();
        assert!(Edit::Append { text: "x".into() }.revert(&mut empty).is_err());
    }

    #[test]
    fn test_history_moves_between_stacks() {
        let mut history = History::new(100);
        history.push(Edit::Append { text: "a".into() });
        history.push(Edit::Append { text: "b".into() });

        history.shift_to_redo();
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);
        assert_eq!(history.last_redo(), Some(&Edit::Append { text: "b".into() }));

        history.shift_to_undo();
        assert_eq!(history.undo_count(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(100);
        history.push(Edit::Append { text: "a".into() });
        history.shift_to_redo();
        assert!(history.can_redo());

        history.push(Edit::Append { text: "b".into() });
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_history_capacity() {
        let mut history = History::new(2);
        for text in ["a", "b", "c"] {
            history.push(Edit::Append { text: text.into() });
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(
            history.undo_entries().next(),
            Some(&Edit::Append { text: "b".into() })
        );

        history.set_max_size(1);
        assert_eq!(history.undo_count(), 1);
    }
}
