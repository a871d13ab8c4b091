//! Core text buffer implementation: an ordered list of lines.
//!
//! ## Why a Vec of lines?
//!
//! Every edit in this editor is addressed as `line:column` and never spans
//! more than one line, so the natural unit of storage is the line:
//! - **Addressing**: line lookup is a plain index
//! - **Undo/Redo**: a record only ever touches one line (or splits one)
//! - **Persistence**: the on-disk order is the vector order
//!
//! ## Learning: Ownership in Action
//!
//! ```rust,ignore
//! let buffer = TextBuffer::new();  // buffer OWNS the lines
//! let lines = buffer.lines();      // lines BORROWS from buffer
//! // buffer.append("x");           // ERROR! Can't mutate while borrowed
//! drop(lines);                     // Release borrow
//! buffer.append("x");              // Now OK!
//! ```

use std::path::Path;

use crate::history::{Edit, History};
use crate::position::{self, Position};
use crate::{BufferError, BufferResult};

/// Line storage plus its edit history.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    /// One entry per line, without line terminators
    lines: Vec<String>,

    /// Edit history for undo/redo
    history: History,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use quill_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer keeping at most `limit` undo steps.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            lines: Vec::new(),
            history: History::new(limit),
        }
    }

    /// Creates a buffer holding the given lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            history: History::default(),
        }
    }

    /// Loads a buffer from a file.
    ///
    /// # Learning: Error Handling with `?`
    ///
    /// The `?` operator propagates errors up the call stack.
    /// It's syntactic sugar for:
    /// ```rust,ignore
    /// match result {
    ///     Ok(value) => value,
    ///     Err(e) => return Err(e.into()),
    /// }
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from(content.as_str()))
    }

    /// Writes the buffer to `path`.
    pub fn save_as(&self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();

        // Write to a temporary file first, then rename (atomic write)
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".quill-tmp");
        let temp_path = path.with_file_name(temp_name);
        std::fs::write(&temp_path, self.to_text())?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns all lines.
    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns a specific line (1-indexed).
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Joins the lines with `\n`, ending with a newline when non-empty.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.lines.len()
    }

    // ==================== Validation ====================

    /// See [`position::validate_line`].
    pub fn validate_line(&self, line: usize) -> BufferResult<()> {
        position::validate_line(&self.lines, line)
    }

    /// See [`position::validate_column`].
    pub fn validate_column(&self, pos: Position) -> BufferResult<usize> {
        position::validate_column(&self.lines, pos)
    }

    /// See [`position::validate_span`].
    pub fn validate_span(&self, pos: Position, length: usize) -> BufferResult<()> {
        position::validate_span(&self.lines, pos, length)
    }

    // ==================== Mutations ====================

    /// Adds `text` as a new final line.
    pub fn append(&mut self, text: &str) {
        let edit = Edit::Append {
            text: text.to_string(),
        };
        self.lines.push(text.to_string());
        self.history.push(edit);
    }

    /// Inserts `text` before the character at `pos`.
    ///
    /// Each `\n` in `text` splits the target line, so the line count grows
    /// by the number of newlines.
    ///
    /// # Learning: `&mut self`
    ///
    /// This method requires exclusive (mutable) access to the buffer.
    /// Rust's borrow checker ensures no other code can read or write
    /// the buffer while this method executes.
    pub fn insert(&mut self, pos: Position, text: &str) -> BufferResult<()> {
        self.validate_column(pos)?;

        let edit = Edit::Insert {
            position: pos,
            text: text.to_string(),
            original: self.lines.get(pos.line_index()).cloned(),
            produced: text.split('\n').count(),
        };
        self.record(edit)
    }

    /// Deletes `length` characters starting at `pos`.
    ///
    /// Returns the removed text. The line count never changes.
    pub fn delete(&mut self, pos: Position, length: usize) -> BufferResult<String> {
        let removed = self.span_text(pos, length)?;
        self.record(Edit::Delete {
            position: pos,
            removed: removed.clone(),
        })?;
        Ok(removed)
    }

    /// Replaces `length` characters starting at `pos` with `text`.
    ///
    /// Only the removed span has to fit on the line; `text` may be any
    /// length, including empty.
    pub fn replace(&mut self, pos: Position, length: usize, text: &str) -> BufferResult<String> {
        let removed = self.span_text(pos, length)?;
        self.record(Edit::Replace {
            position: pos,
            removed: removed.clone(),
            text: text.to_string(),
        })?;
        Ok(removed)
    }

    /// Replaces the whole content. History does not survive this.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.history.clear();
    }

    /// Validates a span and copies out its text.
    fn span_text(&self, pos: Position, length: usize) -> BufferResult<String> {
        self.validate_span(pos, length)?;
        Ok(self.lines[pos.line_index()]
            .chars()
            .skip(pos.column_index())
            .take(length)
            .collect())
    }

    /// Applies a validated edit and pushes it onto the history.
    fn record(&mut self, edit: Edit) -> BufferResult<()> {
        edit.apply(&mut self.lines)?;
        self.history.push(edit);
        Ok(())
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit.
    ///
    /// # Learning: State Management
    ///
    /// Each edit is stored in a history stack. Undo reverts the top record
    /// and moves it to the redo stack. If the record no longer fits the
    /// lines, nothing moves and the buffer is unchanged.
    pub fn undo(&mut self) -> BufferResult<()> {
        let edit = self.history.last_undo().ok_or(BufferError::NothingToUndo)?;
        edit.revert(&mut self.lines)?;
        self.history.shift_to_redo();
        Ok(())
    }

    /// Redoes the last undone edit.
    ///
    /// The record's coordinates are replayed as captured; they are not
    /// re-validated against edits made since.
    pub fn redo(&mut self) -> BufferResult<()> {
        let edit = self.history.last_redo().ok_or(BufferError::NothingToRedo)?;
        edit.apply(&mut self.lines)?;
        self.history.shift_to_undo();
        Ok(())
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns the edit history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Changes how many undo steps are kept.
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history.set_max_size(limit);
    }

    /// Drops both undo and redo stacks.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl From<&str> for TextBuffer {
    /// Splits on `\n`, ignoring one trailing newline and any `\r`.
    fn from(s: &str) -> Self {
        Self::from_lines(s.lines())
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
