//! Document management.
//!
//! ## Learning: Composition over Inheritance
//!
//! Rust doesn't have inheritance. `Document` composes a `TextBuffer`
//! (lines plus undo/redo stacks) and adds what only a document has:
//! its save state and the file it belongs to.

use quill_buffer::{DEFAULT_HISTORY_LIMIT, History, TextBuffer};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// Whether a document differs from what was last saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    /// Matches the file on disk
    #[default]
    Normal,
    /// Has unsaved changes
    Modified,
}

/// A single open text buffer with its own undo/redo stacks.
#[derive(Debug, Clone)]
pub struct Document {
    /// Lines and edit history
    buffer: TextBuffer,

    /// Save state
    state: DocumentState,

    /// File path (None for scratch documents)
    path: Option<PathBuf>,

    /// Append applied commands to the sidecar log
    command_log: bool,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            state: DocumentState::Normal,
            path: None,
            command_log: false,
        }
    }

    /// Creates a scratch document holding `lines`.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buffer: TextBuffer::from_lines(lines),
            ..Self::new()
        }
    }

    /// Opens the document stored at `path`.
    ///
    /// A missing file yields an empty document bound to that path.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = if path.exists() {
            TextBuffer::from_file(path)?
        } else {
            TextBuffer::new()
        };

        Ok(Self {
            buffer,
            state: DocumentState::Normal,
            path: Some(path.to_path_buf()),
            command_log: false,
        })
    }

    /// Rebuilds a document from a session snapshot.
    pub fn restore(path: PathBuf, lines: Vec<String>, state: DocumentState) -> Self {
        Self {
            buffer: TextBuffer::from_lines(lines),
            state,
            path: Some(path),
            command_log: false,
        }
    }

    /// Caps the undo history at `limit` steps.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.buffer.set_history_limit(limit);
        self
    }

    // ==================== Getters ====================

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.state == DocumentState::Modified
    }

    /// Flags the document as changed since the last save.
    pub fn mark_modified(&mut self) {
        self.state = DocumentState::Modified;
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns a mutable reference to the buffer.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Returns all lines.
    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    /// Returns the line count.
    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    /// Returns the undo/redo stacks.
    pub fn history(&self) -> &History {
        self.buffer.history()
    }

    /// Replaces the content wholesale, dropping undo history.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.buffer.set_lines(lines);
    }

    // ==================== File Operations ====================

    /// Saves the document to its path.
    ///
    /// Undo history does not survive a save.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation("document has no file path".into()))?;
        self.save_as(path)
    }

    /// Saves the document to a new path and rebinds it there.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.buffer.save_as(path)?;
        self.buffer.clear_history();
        self.path = Some(path.to_path_buf());
        self.state = DocumentState::Normal;
        tracing::info!(path = %path.display(), lines = self.line_count(), "document saved");
        Ok(())
    }

    // ==================== Command Log ====================

    /// Starts appending every applied command to [`Document::log_path`].
    pub fn enable_command_log(&mut self) {
        self.command_log = true;
    }

    pub fn logs_commands(&self) -> bool {
        self.command_log
    }

    /// The command log file: the document's file name with `.log` appended.
    ///
    /// `None` when logging is off or the document has no path.
    pub fn log_path(&self) -> Option<PathBuf> {
        if !self.command_log {
            return None;
        }
        let path = self.path.as_deref()?;
        let mut name = path.file_name()?.to_os_string();
        name.push(".log");
        Some(path.with_file_name(name))
    }

    /// Appends one command line to the command log, if logging is on.
    ///
    /// A failed write is only reported through `tracing`.
    pub fn log_command(&self, command: &str) {
        let Some(log) = self.log_path() else {
            return;
        };
        let written = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log)
            .and_then(|mut file| writeln!(file, "{command}"));
        if let Err(err) = written {
            tracing::warn!(log = %log.display(), %err, "failed to write command log");
        }
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit, reporting why it could not.
    pub fn try_undo(&mut self) -> CoreResult<()> {
        self.buffer.undo()?;
        self.state = DocumentState::Modified;
        self.log_command("undo");
        tracing::debug!(
            undo = self.history().undo_count(),
            redo = self.history().redo_count(),
            "undo"
        );
        Ok(())
    }

    /// Redoes the last undone edit, reporting why it could not.
    pub fn try_redo(&mut self) -> CoreResult<()> {
        self.buffer.redo()?;
        self.state = DocumentState::Modified;
        self.log_command("redo");
        tracing::debug!(
            undo = self.history().undo_count(),
            redo = self.history().redo_count(),
            "redo"
        );
        Ok(())
    }

    /// Undoes the last edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.try_undo().is_ok()
    }

    /// Redoes the last undone edit. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.try_redo().is_ok()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
