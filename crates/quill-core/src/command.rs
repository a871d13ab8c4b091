//! Edit commands: `append`, `insert`, `delete`, `replace` and `show`.
//!
//! ## Learning: The Command Pattern
//!
//! A command goes through two shapes:
//! - [`Command`] is the parsed request. It is immutable and knows nothing
//!   about the document it will be applied to.
//! - [`quill_buffer::Edit`] is the applied record, built by the buffer only
//!   after validation succeeds. It carries the data needed to reverse itself
//!   and is what lives on the history stack.
//!
//! ## Learning: Enums over Trait Objects
//!
//! The set of edit commands is closed, so a plain enum with exhaustive
//! `match` replaces one type per command: adding a variant makes every
//! dispatch site fail to compile until it is handled.

use std::fmt;
use std::io::Write;

use quill_buffer::Position;

use crate::document::Document;
use crate::parse::{self, NEWLINE_MARKER};
use crate::{CoreError, CoreResult};

/// The edit commands addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Append,
    Insert,
    Delete,
    Replace,
    Show,
}

impl CommandKind {
    /// Every kind, in help order.
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Append,
        CommandKind::Insert,
        CommandKind::Delete,
        CommandKind::Replace,
        CommandKind::Show,
    ];

    /// The keyword that starts the command.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Append => "append",
            CommandKind::Insert => "insert",
            CommandKind::Delete => "delete",
            CommandKind::Replace => "replace",
            CommandKind::Show => "show",
        }
    }

    /// Argument synopsis, for help output.
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Append => "append \"<text>\"",
            CommandKind::Insert => "insert <line>:<col> \"<text>\"",
            CommandKind::Delete => "delete <line>:<col> <len>",
            CommandKind::Replace => "replace <line>:<col> <len> \"<text>\"",
            CommandKind::Show => "show [<start>:<end>]",
        }
    }

    /// Looks a kind up by keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether a successful run of this kind lands on the history stack.
    ///
    /// `show` is read-only and never does.
    pub fn can_undo(self) -> bool {
        !matches!(self, CommandKind::Show)
    }

    /// Parses and runs `raw` against `document`, discarding any output.
    ///
    /// Returns true only if an edit was applied and recorded. Every failure
    /// (parse, position, span) returns false and leaves `document` as it was.
    pub fn execute(self, document: &mut Document, raw: &str) -> bool {
        let mut sink = std::io::sink();
        self.execute_in(&mut CommandContext::new(document, &mut sink), raw)
    }

    /// Like [`CommandKind::execute`], writing `show` output and error
    /// messages to the context's output.
    pub fn execute_in(self, ctx: &mut CommandContext<'_>, raw: &str) -> bool {
        match Command::parse_as(self, raw).and_then(|command| command.run(ctx)) {
            Ok(recorded) => recorded,
            Err(err) => {
                tracing::warn!(command = self.name(), %err, "command rejected");
                let _ = writeln!(ctx.output, "error: {err}");
                false
            }
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inclusive, 1-indexed range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Where a command runs: the target document and an output sink.
pub struct CommandContext<'a> {
    pub document: &'a mut Document,
    pub output: &'a mut dyn Write,
    /// Prefix `show` output with line numbers
    pub line_numbers: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(document: &'a mut Document, output: &'a mut dyn Write) -> Self {
        Self {
            document,
            output,
            line_numbers: true,
        }
    }
}

/// A parsed edit command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Append {
        text: String,
    },
    /// `text` holds real line breaks; the `\n` markers are already expanded.
    Insert {
        position: Position,
        text: String,
    },
    Delete {
        position: Position,
        length: usize,
    },
    Replace {
        position: Position,
        length: usize,
        text: String,
    },
    Show {
        range: Option<LineRange>,
    },
}

impl Command {
    /// Parses a full command line, picking the kind from its first word.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let (name, _) = parse::next_token(raw).ok_or_else(|| CoreError::parse("empty command"))?;
        let kind =
            CommandKind::from_name(name).ok_or_else(|| CoreError::UnknownCommand(name.into()))?;
        Self::parse_as(kind, raw)
    }

    /// Parses `raw` as a command of the given kind.
    pub fn parse_as(kind: CommandKind, raw: &str) -> CoreResult<Self> {
        let rest = parse::keyword(raw, kind.name())?;

        let command = match kind {
            CommandKind::Append => Command::Append {
                text: parse::quoted(rest)?.to_string(),
            },
            CommandKind::Insert => {
                let (position, rest) = parse::required(rest, "position")?;
                Command::Insert {
                    position: parse::position(position)?,
                    text: parse::expand_newlines(parse::quoted(rest)?),
                }
            }
            CommandKind::Delete => {
                let (position, rest) = parse::required(rest, "position")?;
                let (length, rest) = parse::required(rest, "length")?;
                parse::end(rest)?;
                Command::Delete {
                    position: parse::position(position)?,
                    length: parse::length(length)?,
                }
            }
            CommandKind::Replace => {
                let (position, rest) = parse::required(rest, "position")?;
                let (length, rest) = parse::required(rest, "length")?;
                Command::Replace {
                    position: parse::position(position)?,
                    length: parse::length(length)?,
                    text: parse::quoted(rest)?.to_string(),
                }
            }
            CommandKind::Show => match parse::next_token(rest) {
                None => Command::Show { range: None },
                Some((range, rest)) => {
                    parse::end(rest)?;
                    Command::Show {
                        range: Some(parse::line_range(range)?),
                    }
                }
            },
        };
        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Append { .. } => CommandKind::Append,
            Command::Insert { .. } => CommandKind::Insert,
            Command::Delete { .. } => CommandKind::Delete,
            Command::Replace { .. } => CommandKind::Replace,
            Command::Show { .. } => CommandKind::Show,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.kind().can_undo()
    }

    /// Validates and applies the command.
    ///
    /// Returns `Ok(true)` when an edit was recorded on the document's
    /// history, `Ok(false)` for a successful `show`.
    pub fn run(&self, ctx: &mut CommandContext<'_>) -> CoreResult<bool> {
        match self {
            Command::Show { range } => {
                render(ctx, *range)?;
                return Ok(false);
            }
            Command::Append { text } => ctx.document.buffer_mut().append(text),
            Command::Insert { position, text } => {
                ctx.document.buffer_mut().insert(*position, text)?;
            }
            Command::Delete { position, length } => {
                ctx.document.buffer_mut().delete(*position, *length)?;
            }
            Command::Replace {
                position,
                length,
                text,
            } => {
                ctx.document.buffer_mut().replace(*position, *length, text)?;
            }
        }

        ctx.document.mark_modified();
        ctx.document.log_command(&self.to_string());
        tracing::debug!(
            command = %self,
            lines = ctx.document.line_count(),
            history = ctx.document.history().undo_count(),
            "applied"
        );
        Ok(true)
    }
}

/// Writes the requested lines to the context output.
fn render(ctx: &mut CommandContext<'_>, range: Option<LineRange>) -> CoreResult<()> {
    let lines = ctx.document.lines();
    let (start, end) = match range {
        None => (1, lines.len()),
        Some(LineRange { start, end }) => {
            if start == 0 || start > end || end > lines.len() {
                return Err(CoreError::InvalidRange {
                    start,
                    end,
                    line_count: lines.len(),
                });
            }
            (start, end)
        }
    };

    for (idx, line) in lines.iter().enumerate().take(end).skip(start - 1) {
        if ctx.line_numbers {
            writeln!(ctx.output, "{}: {line}", idx + 1)?;
        } else {
            writeln!(ctx.output, "{line}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Command {
    /// Renders the command back into its command-line form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Append { text } => write!(f, "append \"{text}\""),
            Command::Insert { position, text } => {
                write!(f, "insert {position} \"{}\"", text.replace('\n', NEWLINE_MARKER))
            }
            Command::Delete { position, length } => write!(f, "delete {position} {length}"),
            Command::Replace {
                position,
                length,
                text,
            } => write!(f, "replace {position} {length} \"{text}\""),
            Command::Show { range: None } => f.write_str("show"),
            Command::Show {
                range: Some(LineRange { start, end }),
            } => write!(f, "show {start}:{end}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentState;

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().copied())
    }

    fn show(document: &mut Document, raw: &str) -> (bool, String) {
        let mut out = Vec::new();
        let recorded = CommandKind::Show.execute_in(&mut CommandContext::new(document, &mut out), raw);
        (recorded, String::from_utf8(out).unwrap())
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_each_kind() {
        assert_eq!(
            Command::parse("append \"Hello\"").unwrap(),
            Command::Append { text: "Hello".into() }
        );
        assert_eq!(
            Command::parse("insert 1:6 \"a\\nb\"").unwrap(),
            Command::Insert {
                position: Position::new(1, 6),
                text: "a\nb".into()
            }
        );
        assert_eq!(
            Command::parse("delete 2:3 4").unwrap(),
            Command::Delete {
                position: Position::new(2, 3),
                length: 4
            }
        );
        assert_eq!(
            Command::parse("replace 1:1 2 \"Hi There\"").unwrap(),
            Command::Replace {
                position: Position::START,
                length: 2,
                text: "Hi There".into()
            }
        );
        assert_eq!(
            Command::parse("show 2:4").unwrap(),
            Command::Show {
                range: Some(LineRange { start: 2, end: 4 })
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("append test"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("insert 1:1 test"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("delete 1:1"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("delete 1:1 x"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("delete 1:1 2 3"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("show 1:2 3:4"), Err(CoreError::Parse(_))));
        assert!(matches!(Command::parse("frobnicate"), Err(CoreError::UnknownCommand(_))));
        assert!(matches!(
            Command::parse_as(CommandKind::Delete, "insert 1:1 \"x\""),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for raw in [
            "append \"Hello\"",
            "insert 1:6 \"a\\nb\"",
            "delete 1:7 10",
            "replace 1:1 5 \"Hi\"",
            "show",
            "show 2:4",
        ] {
            assert_eq!(Command::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_can_undo() {
        assert!(!CommandKind::Show.can_undo());
        for kind in [
            CommandKind::Append,
            CommandKind::Insert,
            CommandKind::Delete,
            CommandKind::Replace,
        ] {
            assert!(kind.can_undo(), "{kind} should be undoable");
        }
        assert_eq!(CommandKind::from_name("replace"), Some(CommandKind::Replace));
        assert_eq!(CommandKind::from_name("undo"), None);
    }

    // ==================== Append ====================

    #[test]
    fn test_append_on_empty_document() {
        let mut document = Document::new();
        assert!(CommandKind::Append.execute(&mut document, "append \"Hello\""));
        assert_eq!(document.lines(), ["Hello"]);
        assert_eq!(document.state(), DocumentState::Modified);
        assert_eq!(document.history().undo_count(), 1);
    }

    #[test]
    fn test_append_variants() {
        let mut document = Document::new();
        assert!(CommandKind::Append.execute(&mut document, "append \"\""));
        assert!(CommandKind::Append.execute(&mut document, "append \"!@#$%^&*()_+-=[]{}|;:,.<>?\""));
        assert!(CommandKind::Append.execute(&mut document, "append \"你好，世界！\""));
        assert_eq!(document.lines(), ["", "!@#$%^&*()_+-=[]{}|;:,.<>?", "你好，世界！"]);
    }

    #[test]
    fn test_append_without_quotes_fails() {
        let mut document = Document::new();
        assert!(!CommandKind::Append.execute(&mut document, "append test"));
        assert!(document.lines().is_empty());
        assert_eq!(document.state(), DocumentState::Normal);
        assert!(!document.history().can_undo());
    }

    #[test]
    fn test_append_undo_redo() {
        let mut document = Document::new();
        CommandKind::Append.execute(&mut document, "append \"Test Line\"");
        assert!(document.undo());
        assert!(document.lines().is_empty());
        assert!(document.redo());
        assert_eq!(document.lines(), ["Test Line"]);
    }

    // ==================== Insert ====================

    #[test]
    fn test_insert_positions() {
        let mut document = doc(&["Hello World"]);
        assert!(CommandKind::Insert.execute(&mut document, "insert 1:7 \"Beautiful \""));
        assert_eq!(document.lines(), ["Hello Beautiful World"]);

        let mut document = doc(&["Hello World"]);
        assert!(CommandKind::Insert.execute(&mut document, "insert 1:1 \"Start \""));
        assert_eq!(document.lines(), ["Start Hello World"]);

        let mut document = doc(&["Hello"]);
        assert!(CommandKind::Insert.execute(&mut document, "insert 1:6 \" World\""));
        assert_eq!(document.lines(), ["Hello World"]);
    }

    #[test]
    fn test_insert_multiline_text() {
        let mut document = doc(&["Hello World"]);
        assert!(CommandKind::Insert.execute(&mut document, "insert 1:6 \"\\nNew Line\\nAnother\""));
        assert_eq!(document.lines(), ["Hello", "New Line", "Another World"]);

        assert!(document.undo());
        assert_eq!(document.lines(), ["Hello World"]);
    }

    #[test]
    fn test_insert_on_empty_document() {
        let mut document = Document::new();
        assert!(!CommandKind::Insert.execute(&mut document, "insert 1:2 \"Test\""));
        assert!(!CommandKind::Insert.execute(&mut document, "insert 2:1 \"Test\""));
        assert!(document.lines().is_empty());

        assert!(CommandKind::Insert.execute(&mut document, "insert 1:1 \"First Line\""));
        assert_eq!(document.lines(), ["First Line"]);
    }

    #[test]
    fn test_insert_invalid_positions() {
        let mut document = doc(&["Line 1"]);
        assert!(!CommandKind::Insert.execute(&mut document, "insert 10:1 \"Test\""));
        assert!(!CommandKind::Insert.execute(&mut document, "insert 1:100 \"Test\""));
        assert!(!CommandKind::Insert.execute(&mut document, "insert 1:1 Test"));
        assert_eq!(document.lines(), ["Line 1"]);
        assert_eq!(document.state(), DocumentState::Normal);
    }

    #[test]
    fn test_insert_undo_redo() {
        let mut document = doc(&["Hello World"]);
        CommandKind::Insert.execute(&mut document, "insert 1:7 \"Beautiful \"");
        assert!(document.undo());
        assert_eq!(document.lines(), ["Hello World"]);
        assert!(document.redo());
        assert_eq!(document.lines(), ["Hello Beautiful World"]);
    }

    // ==================== Delete ====================

    #[test]
    fn test_delete_spans() {
        let cases = [
            ("Hello World", "delete 1:1 6", "World"),
            ("Hello Beautiful World", "delete 1:7 10", "Hello World"),
            ("Hello World", "delete 1:7 5", "Hello "),
            ("Hello", "delete 1:1 5", ""),
        ];
        for (line, raw, expected) in cases {
            let mut document = doc(&[line]);
            assert!(CommandKind::Delete.execute(&mut document, raw), "{raw}");
            assert_eq!(document.lines(), [expected], "{raw}");
        }
    }

    #[test]
    fn test_delete_rejections_leave_document_unchanged() {
        let mut document = doc(&["Hello"]);
        for raw in ["delete 1:1 100", "delete 1:3 4", "delete 10:1 5", "delete 1:100 5"] {
            assert!(!CommandKind::Delete.execute(&mut document, raw), "{raw}");
        }
        assert_eq!(document.lines(), ["Hello"]);
        assert_eq!(document.history().undo_count(), 0);
        assert!(!CommandKind::Delete.execute(&mut Document::new(), "delete 1:1 0"));
    }

    #[test]
    fn test_delete_undo_redo() {
        let mut document = doc(&["Hello World"]);
        CommandKind::Delete.execute(&mut document, "delete 1:7 5");
        assert!(document.undo());
        assert_eq!(document.lines(), ["Hello World"]);
        assert!(document.redo());
        assert_eq!(document.lines(), ["Hello "]);
    }

    // ==================== Replace ====================

    #[test]
    fn test_replace_spans() {
        let cases = [
            ("Hello World", "replace 1:1 5 \"Hi\"", "Hi World"),
            ("fast fox", "replace 1:1 4 \"slow\"", "slow fox"),
            ("Hi", "replace 1:1 2 \"Hello World\"", "Hello World"),
            ("Hello World", "replace 1:1 11 \"Hi\"", "Hi"),
            ("Hello World", "replace 1:7 5 \"\"", "Hello "),
            ("Hello", "replace 1:1 2 \"Hi There\"", "Hi Therello"),
        ];
        for (line, raw, expected) in cases {
            let mut document = doc(&[line]);
            assert!(CommandKind::Replace.execute(&mut document, raw), "{raw}");
            assert_eq!(document.lines(), [expected], "{raw}");
            assert!(document.undo());
            assert_eq!(document.lines(), [line], "{raw}");
        }
    }

    #[test]
    fn test_replace_rejections() {
        let mut document = doc(&["Hello"]);
        assert!(!CommandKind::Replace.execute(&mut document, "replace 1:1 100 \"Test\""));
        assert!(!CommandKind::Replace.execute(&mut document, "replace 10:1 5 \"Test\""));
        assert!(!CommandKind::Replace.execute(&mut document, "replace 1:1 5 Test"));
        assert_eq!(document.lines(), ["Hello"]);
        assert!(!document.history().can_undo());
    }

    #[test]
    fn test_huge_length_is_rejected() {
        let huge = usize::MAX;
        let mut document = doc(&["Hello"]);
        assert!(!CommandKind::Delete.execute(&mut document, &format!("delete 1:2 {huge}")));
        assert!(!CommandKind::Replace.execute(&mut document, &format!("replace 1:2 {huge} \"x\"")));
        assert_eq!(document.lines(), ["Hello"]);
        assert_eq!(document.state(), DocumentState::Normal);
        assert!(!document.history().can_undo());
    }

    // ==================== Show ====================

    #[test]
    fn test_show_never_records() {
        let mut document = doc(&["Line 1", "Line 2", "Line 3", "Line 4", "Line 5"]);

        let (recorded, out) = show(&mut document, "show");
        assert!(!recorded);
        assert_eq!(out, "1: Line 1\n2: Line 2\n3: Line 3\n4: Line 4\n5: Line 5\n");

        let (recorded, out) = show(&mut document, "show 2:4");
        assert!(!recorded);
        assert_eq!(out, "2: Line 2\n3: Line 3\n4: Line 4\n");

        assert_eq!(document.history().undo_count(), 0);
        assert_eq!(document.state(), DocumentState::Normal);
    }

    #[test]
    fn test_show_invalid_range_reports_error() {
        let mut document = doc(&["Line 1", "Line 2"]);
        for raw in ["show 5:10", "show 2:1", "show 0:1", "show x"] {
            let (recorded, out) = show(&mut document, raw);
            assert!(!recorded, "{raw}");
            assert!(out.starts_with("error: "), "{raw}: {out}");
        }
    }

    #[test]
    fn test_show_empty_document_and_plain_style() {
        let mut empty = Document::new();
        assert_eq!(show(&mut empty, "show"), (false, String::new()));

        let mut document = doc(&["a", "b"]);
        let mut out = Vec::new();
        let mut ctx = CommandContext::new(&mut document, &mut out);
        ctx.line_numbers = false;
        assert!(!CommandKind::Show.execute_in(&mut ctx, "show 2:2"));
        assert_eq!(out, b"b\n");
    }

    // ==================== Undo/Redo ====================

    #[test]
    fn test_multiple_undo_redo() {
        let mut document = Document::new();
        for raw in ["append \"Line 1\"", "append \"Line 2\"", "append \"Line 3\""] {
            assert!(CommandKind::Append.execute(&mut document, raw));
        }

        for remaining in [2, 1, 0] {
            assert!(document.undo());
            assert_eq!(document.line_count(), remaining);
        }
        assert!(!document.undo());

        assert!(document.redo());
        assert_eq!(document.lines(), ["Line 1"]);
        assert!(document.redo());
        assert_eq!(document.lines(), ["Line 1", "Line 2"]);
    }

    #[test]
    fn test_new_command_clears_redo_stack() {
        let mut document = Document::new();
        CommandKind::Append.execute(&mut document, "append \"Line 1\"");
        document.undo();
        assert_eq!(document.history().redo_count(), 1);

        CommandKind::Append.execute(&mut document, "append \"Line 2\"");
        assert_eq!(document.history().redo_count(), 0);
        assert!(!document.redo());
    }

    #[test]
    fn test_failed_command_keeps_redo_stack() {
        let mut document = doc(&["Hello"]);
        CommandKind::Delete.execute(&mut document, "delete 1:1 1");
        document.undo();

        assert!(!CommandKind::Delete.execute(&mut document, "delete 1:1 100"));
        assert_eq!(document.history().redo_count(), 1);
    }

    #[test]
    fn test_mixed_operations_undo_redo() {
        let mut document = doc(&["Hello World"]);
        let steps = [
            (CommandKind::Insert, "insert 1:7 \"Beautiful \"", "Hello Beautiful World"),
            (CommandKind::Delete, "delete 1:7 10", "Hello World"),
            (CommandKind::Replace, "replace 1:1 5 \"Hi\"", "Hi World"),
        ];
        for (kind, raw, expected) in steps {
            assert!(kind.execute(&mut document, raw));
            assert_eq!(document.lines(), [expected]);
        }

        for expected in ["Hello World", "Hello Beautiful World", "Hello World"] {
            assert!(document.undo());
            assert_eq!(document.lines(), [expected]);
        }
        for (_, _, expected) in steps {
            assert!(document.redo());
            assert_eq!(document.lines(), [expected]);
        }
    }
}
