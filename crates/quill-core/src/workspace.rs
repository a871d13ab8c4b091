//! Workspace: the set of open documents and which one is current.
//!
//! ## Learning: Owning a Registry
//!
//! The workspace owns every open `Document`. Callers borrow the current one
//! with `current_mut()` for the duration of a single command, so there is
//! never more than one live `&mut Document` and no global state.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::TreeConfig;
use crate::document::Document;
use crate::{CoreError, CoreResult};

/// Open documents, most recently used last.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Open documents in recent-use order
    documents: Vec<Document>,

    /// Path of the current document
    current: Option<PathBuf>,

    /// Undo steps kept by newly opened documents
    history_limit: usize,
}

/// One row of `editor-list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub path: PathBuf,
    pub current: bool,
    pub modified: bool,
}

impl std::fmt::Display for DocumentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.current { ">" } else { " " };
        write!(f, "{marker} {}", self.path.display())?;
        if self.modified {
            f.write_str(" [modified]")?;
        }
        Ok(())
    }
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::with_history_limit(quill_buffer::DEFAULT_HISTORY_LIMIT)
    }

    /// Creates an empty workspace whose documents keep `limit` undo steps.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            documents: Vec::new(),
            current: None,
            history_limit: limit,
        }
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.documents.iter().position(|doc| doc.path() == Some(path))
    }

    /// Moves the document at `idx` to the most-recent slot and makes it current.
    fn touch(&mut self, idx: usize) {
        let doc = self.documents.remove(idx);
        self.current = doc.path().map(Path::to_path_buf);
        self.documents.push(doc);
    }

    /// Adds a document and makes it current.
    ///
    /// Fails if a document with the same path is already open.
    pub fn insert(&mut self, doc: Document) -> CoreResult<()> {
        let path = doc
            .path()
            .map(Path::to_path_buf)
            .ok_or_else(|| CoreError::InvalidOperation("document has no file path".into()))?;
        if self.contains(&path) {
            return Err(CoreError::AlreadyOpen(path));
        }
        self.documents.push(doc.with_history_limit(self.history_limit));
        self.current = Some(path);
        Ok(())
    }

    /// Opens `path` (empty if the file does not exist yet) and makes it current.
    pub fn load(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        if self.contains(path) {
            return Err(CoreError::AlreadyOpen(path.to_path_buf()));
        }
        self.insert(Document::open(path)?)?;
        tracing::info!(path = %path.display(), "document loaded");
        Ok(())
    }

    /// Starts a new, not yet saved, document at `path`.
    ///
    /// With `with_log`, every command applied to it is appended to its
    /// command log (see [`Document::log_path`]).
    pub fn init(&mut self, path: impl AsRef<Path>, with_log: bool) -> CoreResult<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(CoreError::InvalidOperation(format!(
                "{} already exists, use load",
                path.display()
            )));
        }
        let mut doc = Document::open(path)?;
        doc.mark_modified();
        if with_log {
            doc.enable_command_log();
        }
        self.insert(doc)?;
        tracing::info!(path = %path.display(), with_log, "document created");
        Ok(())
    }

    /// Switches the current document.
    pub fn edit(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let idx = self
            .position(path)
            .ok_or_else(|| CoreError::DocumentNotFound(path.to_path_buf()))?;
        self.touch(idx);
        Ok(())
    }

    /// Resolves an explicit path, or the current document when `None`.
    fn resolve(&self, path: Option<&Path>) -> CoreResult<usize> {
        match path {
            Some(path) => self
                .position(path)
                .ok_or_else(|| CoreError::DocumentNotFound(path.to_path_buf())),
            None => self
                .current
                .as_deref()
                .and_then(|current| self.position(current))
                .ok_or(CoreError::NoActiveDocument),
        }
    }

    /// Saves one document (the current one when `path` is `None`).
    pub fn save(&mut self, path: Option<&Path>) -> CoreResult<()> {
        let idx = self.resolve(path)?;
        self.documents[idx].save()
    }

    /// Saves every open document, returning how many were written.
    pub fn save_all(&mut self) -> CoreResult<usize> {
        for doc in &mut self.documents {
            doc.save()?;
        }
        Ok(self.documents.len())
    }

    /// Closes one document (the current one when `path` is `None`).
    ///
    /// Unsaved changes block the close unless `force` is set. The most
    /// recently used remaining document becomes current.
    pub fn close(&mut self, path: Option<&Path>, force: bool) -> CoreResult<PathBuf> {
        let idx = self.resolve(path)?;
        let doc = &self.documents[idx];
        let closed = doc.path().map(Path::to_path_buf).unwrap_or_default();

        if doc.is_modified() && !force {
            return Err(CoreError::UnsavedChanges(closed));
        }

        self.documents.remove(idx);
        if self.current.as_deref() == Some(closed.as_path()) {
            self.current = self
                .documents
                .last()
                .and_then(|doc| doc.path().map(Path::to_path_buf));
        }
        tracing::info!(path = %closed.display(), "document closed");
        Ok(closed)
    }

    /// Lists open documents in recent-use order.
    pub fn list(&self) -> Vec<DocumentEntry> {
        self.documents
            .iter()
            .filter_map(|doc| {
                let path = doc.path()?.to_path_buf();
                Some(DocumentEntry {
                    current: self.current.as_ref() == Some(&path),
                    modified: doc.is_modified(),
                    path,
                })
            })
            .collect()
    }

    /// Returns the current document.
    pub fn current(&self) -> Option<&Document> {
        let path = self.current.as_deref()?;
        self.documents.iter().find(|doc| doc.path() == Some(path))
    }

    /// Returns a mutable reference to the current document.
    pub fn current_mut(&mut self) -> Option<&mut Document> {
        let path = self.current.clone()?;
        self.documents
            .iter_mut()
            .find(|doc| doc.path() == Some(path.as_path()))
    }

    /// Returns the current document's path.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Checks whether `path` is open.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.position(path.as_ref()).is_some()
    }

    /// Iterates open documents, least recently used first.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Returns true if any open document has unsaved changes.
    pub fn has_unsaved(&self) -> bool {
        self.documents.iter().any(Document::is_modified)
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A tree structure representing files and directories.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// Root node
    pub root: FileNode,
}

impl FileTree {
    /// Creates a file tree from a directory path.
    pub fn from_path(path: &Path, config: &TreeConfig) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        let root = Self::build_node(path, config.max_depth, config);
        Ok(Self { root })
    }

    /// Builds a file node recursively.
    fn build_node(path: &Path, depth: usize, config: &TreeConfig) -> FileNode {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if path.is_file() {
            return FileNode {
                name,
                kind: NodeKind::File,
                children: Vec::new(),
            };
        }

        let mut children = Vec::new();

        if depth > 0 {
            if let Ok(entries) = std::fs::read_dir(path) {
                for entry in entries.flatten() {
                    let entry_name = entry.file_name().to_string_lossy().into_owned();
                    if config.ignore.iter().any(|ignored| *ignored == entry_name) {
                        continue;
                    }
                    children.push(Self::build_node(&entry.path(), depth - 1, config));
                }

                // Sort: directories first, then alphabetically
                children.sort_by(|a, b| match (&a.kind, &b.kind) {
                    (NodeKind::Directory, NodeKind::File) => std::cmp::Ordering::Less,
                    (NodeKind::File, NodeKind::Directory) => std::cmp::Ordering::Greater,
                    _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                });
            }
        }

        FileNode {
            name,
            kind: NodeKind::Directory,
            children,
        }
    }

    /// Renders the tree with box-drawing connectors.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.root.name);
        Self::render_children(&self.root, "", &mut out);
        out
    }

    fn render_children(node: &FileNode, prefix: &str, out: &mut String) {
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let _ = writeln!(out, "{prefix}{connector}{}", child.name);

            let extension = if last { "    " } else { "│   " };
            Self::render_children(child, &format!("{prefix}{extension}"), out);
        }
    }
}

/// A node in the file tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File/directory name
    pub name: String,

    /// Node type
    pub kind: NodeKind,

    /// Child nodes (for directories)
    pub children: Vec<FileNode>,
}

/// Type of file tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}
