//! # Quill Buffer
//!
//! Line-oriented text storage with reversible edits.
//!
//! ## Key Concepts
//!
//! ### Lines, not bytes
//! - `TextBuffer` owns an ordered `Vec<String>`, one entry per line
//! - An empty document is an empty vector, never `vec![""]`
//! - Positions are 1-indexed and columns count `char`s, not bytes
//!
//! ### Validate, then mutate
//! - Every mutation checks its `Position` against the current lines first
//! - A rejected edit leaves the buffer exactly as it was
//! - An accepted edit produces an [`Edit`] record that can reverse itself

mod buffer;
mod history;
mod position;

pub use buffer::TextBuffer;
pub use history::{DEFAULT_HISTORY_LIMIT, Edit, History};
pub use position::{Position, validate_column, validate_line, validate_span};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid line {line}: document has {line_count} line(s)")]
    InvalidLine { line: usize, line_count: usize },

    #[error("Invalid column {column} on line {line}: line has {line_len} character(s)")]
    InvalidColumn {
        line: usize,
        column: usize,
        line_len: usize,
    },

    #[error("Span of {length} character(s) at {position} runs past the end of the line ({line_len} character(s))")]
    SpanExceedsLine {
        position: Position,
        length: usize,
        line_len: usize,
    },

    #[error("Cannot replay {kind} at {position}: the buffer no longer matches")]
    StaleEdit {
        kind: &'static str,
        position: Position,
    },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_lines(), 0);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3\n");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(1), Some("Line 1"));
        assert_eq!(buffer.line(3), Some("Line 3"));
        assert_eq!(buffer.line(4), None);
    }

    #[test]
    fn test_edit_then_undo_redo() {
        let mut buffer = TextBuffer::new();
        buffer.append("Hello");
        buffer.insert(Position::new(1, 6), " World").unwrap();
        assert_eq!(buffer.lines(), ["Hello World"]);

        buffer.undo().unwrap();
        assert_eq!(buffer.lines(), ["Hello"]);

        buffer.redo().unwrap();
        assert_eq!(buffer.lines(), ["Hello World"]);
    }

    #[test]
    fn test_error_messages_are_one_indexed() {
        let buffer = TextBuffer::from("Hello");
        let err = buffer.validate_span(Position::new(1, 1), 100).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Span of 100 character(s) at 1:1 runs past the end of the line (5 character(s))"
        );
    }
}
