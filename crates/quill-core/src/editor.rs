//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade: the outer loop hands it one raw input line at
//! a time and it decides whether that line is an edit command for the
//! current document, an undo/redo, or a workspace command.

use std::io::Write;
use std::path::Path;

use crate::command::{CommandContext, CommandKind};
use crate::config::Config;
use crate::document::Document;
use crate::parse;
use crate::workspace::{FileTree, Workspace};
use crate::{CoreError, CoreResult};

/// Whether the input loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Workspace-level commands, for `help`.
const WORKSPACE_USAGE: [&str; 10] = [
    "undo",
    "redo",
    "load <file>",
    "init <file> [with-log]",
    "save [<file>|all]",
    "close [<file>] [--force]",
    "edit <file>",
    "editor-list",
    "dir-tree [<dir>]",
    "exit",
];

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by the single thread running the input loop. Commands
/// run one at a time, to completion, in the order they are issued.
pub struct Editor {
    /// Open documents
    workspace: Workspace,

    /// Editor configuration
    config: Config,
}

impl Editor {
    /// Creates an editor with an empty workspace.
    pub fn new(config: Config) -> Self {
        let workspace = Workspace::with_history_limit(config.history.limit);
        Self { workspace, config }
    }

    /// Creates an editor around an existing (e.g. restored) workspace.
    pub fn with_workspace(config: Config, workspace: Workspace) -> Self {
        Self { workspace, config }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn current_document(&mut self) -> CoreResult<&mut Document> {
        self.workspace
            .current_mut()
            .ok_or(CoreError::NoActiveDocument)
    }

    /// Runs one raw input line.
    ///
    /// Edit commands report their own failures to `out` (they return a
    /// boolean, not an error). Everything else returns its error.
    pub fn execute_line(&mut self, raw: &str, out: &mut dyn Write) -> CoreResult<Flow> {
        let Some((name, args)) = parse::next_token(raw) else {
            return Ok(Flow::Continue);
        };
        tracing::debug!(command = name, "dispatch");

        if let Some(kind) = CommandKind::from_name(name) {
            let line_numbers = self.config.display.line_numbers;
            let document = self.current_document()?;
            let mut ctx = CommandContext {
                document,
                output: out,
                line_numbers,
            };
            kind.execute_in(&mut ctx, raw);
            return Ok(Flow::Continue);
        }

        match name {
            "undo" => {
                parse::end(args)?;
                self.current_document()?.try_undo()?;
            }
            "redo" => {
                parse::end(args)?;
                self.current_document()?.try_redo()?;
            }
            "load" => self.workspace.load(single_path(args)?)?,
            "init" => {
                let (path, rest) = parse::required(args, "file path")?;
                let with_log = match parse::next_token(rest) {
                    None => false,
                    Some(("with-log", tail)) => {
                        parse::end(tail)?;
                        true
                    }
                    Some((other, _)) => {
                        return Err(CoreError::Parse(format!("unexpected argument `{other}`")));
                    }
                };
                self.workspace.init(Path::new(path), with_log)?;
            }
            "edit" => self.workspace.edit(single_path(args)?)?,
            "save" => match parse::next_token(args) {
                None => self.workspace.save(None)?,
                Some(("all", rest)) => {
                    parse::end(rest)?;
                    let saved = self.workspace.save_all()?;
                    writeln!(out, "saved {saved} document(s)")?;
                }
                Some((path, rest)) => {
                    parse::end(rest)?;
                    self.workspace.save(Some(Path::new(path)))?;
                }
            },
            "close" => {
                let (path, force) = close_args(args)?;
                self.workspace.close(path, force)?;
            }
            "editor-list" => {
                parse::end(args)?;
                for entry in self.workspace.list() {
                    writeln!(out, "{entry}")?;
                }
            }
            "dir-tree" => {
                let root = match parse::next_token(args) {
                    None => ".",
                    Some((dir, rest)) => {
                        parse::end(rest)?;
                        dir
                    }
                };
                let tree = FileTree::from_path(Path::new(root), &self.config.tree)?;
                write!(out, "{}", tree.render())?;
            }
            "help" => {
                for kind in CommandKind::ALL {
                    writeln!(out, "  {}", kind.usage())?;
                }
                for usage in WORKSPACE_USAGE {
                    writeln!(out, "  {usage}")?;
                }
            }
            "exit" | "quit" => return Ok(Flow::Exit),
            other => return Err(CoreError::UnknownCommand(other.to_string())),
        }
        Ok(Flow::Continue)
    }
}

/// Exactly one path argument.
fn single_path(args: &str) -> CoreResult<&Path> {
    let (path, rest) = parse::required(args, "file path")?;
    parse::end(rest)?;
    Ok(Path::new(path))
}

/// `[<file>] [--force]`, in either order.
fn close_args(args: &str) -> CoreResult<(Option<&Path>, bool)> {
    let mut path = None;
    let mut force = false;
    let mut rest = args;
    while let Some((token, tail)) = parse::next_token(rest) {
        match token {
            "--force" | "-f" => force = true,
            _ if path.is_none() => path = Some(Path::new(token)),
            _ => return Err(CoreError::Parse(format!("unexpected argument `{token}`"))),
        }
        rest = tail;
    }
    Ok((path, force))
}
