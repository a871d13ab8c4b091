//! # Quill - A Line-Oriented Text Editor
//!
//! Edit files by typing commands such as `insert 1:7 "text"`, with
//! per-document undo and redo.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with the previous session
//! cargo run
//!
//! # Open files
//! cargo run -- notes.txt todo.txt
//!
//! # Fresh start, chatty logs on stderr
//! cargo run -- --no-session -vv
//! ```

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quill_core::{Config, Editor, Flow, Session};

/// Quill - a line-oriented text editor with undo/redo
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Neither restore nor save the session snapshot
    #[arg(long)]
    no_session: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load(),
    };
    let session_path = if args.no_session {
        None
    } else {
        config.session_path()
    };

    let mut editor = restore(config, session_path.as_deref());
    for file in &args.files {
        if let Err(err) = editor.workspace_mut().load(file) {
            eprintln!("error: {err}");
        }
    }

    run(&mut editor)?;

    if let Some(path) = session_path {
        Session::capture(editor.workspace())
            .write(&path)
            .with_context(|| format!("failed to write session {}", path.display()))?;
    }
    Ok(())
}

/// Builds the editor, reopening the last session when there is one.
fn restore(config: Config, session_path: Option<&std::path::Path>) -> Editor {
    let snapshot = session_path.map(|path| Session::read(path)).transpose();
    match snapshot {
        Ok(Some(Some(session))) => {
            let workspace = session.restore(config.history.limit);
            tracing::info!(documents = workspace.len(), "session restored");
            Editor::with_workspace(config, workspace)
        }
        Ok(_) => Editor::new(config),
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable session");
            Editor::new(config)
        }
    }
}

/// Reads commands from stdin until `exit` or end of input.
fn run(editor: &mut Editor) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        match editor.execute_line(line.trim_end_matches(['\r', '\n']), &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => writeln!(stdout, "error: {err}")?,
        }
    }

    if editor.workspace().has_unsaved() {
        tracing::warn!("exiting with unsaved changes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["quill"]);
        assert!(args.files.is_empty());
        assert!(!args.no_session);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_files() {
        let args = Args::parse_from(["quill", "a.txt", "b.txt", "--no-session", "-vv"]);
        assert_eq!(args.files, [PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(args.no_session);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_restore_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let editor = restore(Config::default(), Some(&dir.path().join("none.json")));
        assert!(editor.workspace().is_empty());
    }
}
