//! Session snapshots: which documents were open, and what they held.
//!
//! A snapshot lets the editor come back after a restart with the same
//! documents, including unsaved content. Undo/redo stacks are in-memory
//! only and are not part of it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentState};
use crate::workspace::Workspace;
use crate::CoreResult;

/// Serialisable view of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Document that was current
    pub current: Option<PathBuf>,

    /// Open documents, least recently used first
    pub files: Vec<SessionFile>,
}

/// One open document in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub state: DocumentState,
    /// Whether the command log was on
    #[serde(default)]
    pub command_log: bool,
}

impl Session {
    /// Captures the open documents of `workspace`.
    pub fn capture(workspace: &Workspace) -> Self {
        let files = workspace
            .iter()
            .filter_map(|doc| {
                Some(SessionFile {
                    path: doc.path()?.to_path_buf(),
                    lines: doc.lines().to_vec(),
                    state: doc.state(),
                    command_log: doc.logs_commands(),
                })
            })
            .collect();

        Self {
            current: workspace.current_path().map(Path::to_path_buf),
            files,
        }
    }

    /// Reads a snapshot. A missing file means there is nothing to restore.
    pub fn read(path: impl AsRef<Path>) -> CoreResult<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Writes the snapshot as JSON, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), files = self.files.len(), "session written");
        Ok(())
    }

    /// Rebuilds a workspace from the snapshot.
    pub fn restore(self, history_limit: usize) -> Workspace {
        let mut workspace = Workspace::with_history_limit(history_limit);
        for file in self.files {
            let mut doc = Document::restore(file.path, file.lines, file.state);
            if file.command_log {
                doc.enable_command_log();
            }
            if let Err(err) = workspace.insert(doc) {
                tracing::warn!(%err, "skipping document from session");
            }
        }
        if let Some(current) = self.current {
            if let Err(err) = workspace.edit(&current) {
                tracing::warn!(%err, "session's current document is gone");
            }
        }
        workspace
    }
}
