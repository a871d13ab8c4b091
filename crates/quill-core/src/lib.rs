//! # Quill Core
//!
//! Command engine and editor state for a line-oriented text editor.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Editor                            │
//! │   raw line ──► dispatcher ──► Workspace / Command        │
//! │                                  │                       │
//! │  ┌───────────────────────────────┴─────────┐            │
//! │  │               Workspace                  │            │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐    │            │
//! │  │  │  Doc 1  │ │  Doc 2  │ │  Doc 3  │    │            │
//! │  │  └─────────┘ └─────────┘ └─────────┘    │            │
//! │  └──────────────────────────────────────────┘            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never look documents up themselves: the caller hands them a
//! `&mut Document`, and each document owns its own undo/redo stacks.

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
mod parse;
pub mod session;
pub mod workspace;

pub use command::{Command, CommandContext, CommandKind, LineRange};
pub use config::Config;
pub use document::{Document, DocumentState};
pub use editor::{Editor, Flow};
pub use session::Session;
pub use workspace::Workspace;

use std::path::PathBuf;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid range {start}:{end}: document has {line_count} line(s)")]
    InvalidRange {
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("{0}")]
    Buffer(#[from] quill_buffer::BufferError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Document not open: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Document already open: {}", .0.display())]
    AlreadyOpen(PathBuf),

    #[error("Unsaved changes in {}: run `save` first, or `close --force` to discard them", .0.display())]
    UnsavedChanges(PathBuf),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session error: {0}")]
    Session(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CoreError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        CoreError::Parse(message.into())
    }
}
