//! Edit scripts: a line-oriented command language that drives a
//! [`SpanEditor`] the way toolbar buttons and keystrokes would.
//!
//! ```text
//! # comments and blank lines are skipped
//! insert 0 "Groceries\nmilk"
//! bold 0 9
//! bullet 12
//! ```

use thiserror::Error;

use crate::editor::{SpanEditor, Style};

/// All edits a script can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Toggle a style over a selection (or the pending style at a caret)
    Toggle { style: Style, start: usize, end: usize },
    /// Insert text at an offset
    Insert { offset: usize, text: String },
    /// Delete chars at an offset
    Delete { offset: usize, len: usize },
    /// Replace chars at an offset with text
    Replace {
        offset: usize,
        len: usize,
        text: String,
    },
    /// Toggle a bullet on the caret's line
    Bullet(usize),
    /// Toggle a numbered item on the caret's line
    Numbered(usize),
    /// Cycle the checkbox on the caret's line
    Checkbox(usize),
    /// Indent the caret's line
    Indent(usize),
    /// Outdent the caret's line
    Outdent(usize),
    /// Turn every pending style off
    ClearStyle,
}

/// Why a script line could not be parsed. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` expects {expected}")]
    MissingArgument {
        line: usize,
        command: String,
        expected: &'static str,
    },
    #[error("line {line}: `{value}` is not a valid offset or length")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("line {line}: unexpected `{extra}` after `{command}`")]
    TrailingInput {
        line: usize,
        command: String,
        extra: String,
    },
}

impl Command {
    /// Apply this command to an editor.
    pub fn apply(&self, editor: &mut SpanEditor) {
        match self {
            Self::Toggle { style, start, end } => editor.toggle(*style, *start, *end),
            Self::Insert { offset, text } => {
                editor.insert(*offset, text);
            }
            Self::Delete { offset, len } => editor.delete(*offset, *len),
            Self::Replace { offset, len, text } => {
                editor.apply_edit(*offset, *len, text);
            }
            Self::Bullet(caret) => editor.insert_bullet_point(*caret),
            Self::Numbered(caret) => editor.insert_numbered_item(*caret),
            Self::Checkbox(caret) => editor.insert_checkbox(*caret),
            Self::Indent(caret) => editor.increase_indent(*caret),
            Self::Outdent(caret) => editor.decrease_indent(*caret),
            Self::ClearStyle => editor.clear_formatting_state(),
        }
    }
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns the first line that fails to parse.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        commands.push(parse_line(line, idx + 1)?);
    }
    Ok(commands)
}

/// Apply every command in order.
pub fn run_script(editor: &mut SpanEditor, commands: &[Command]) {
    for command in commands {
        tracing::trace!(?command, "apply");
        command.apply(editor);
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<Command, ScriptError> {
    let tokens = tokenize(line, line_no)?;
    let mut args = Args {
        tokens: tokens.into_iter(),
        command: String::new(),
        line: line_no,
    };
    let name = args.tokens.next().unwrap_or_default();
    args.command.clone_from(&name);

    let command = match name.as_str() {
        "bold" | "italic" | "underline" | "strike" => {
            let style = match name.as_str() {
                "bold" => Style::Bold,
                "italic" => Style::Italic,
                "underline" => Style::Underline,
                _ => Style::Strikethrough,
            };
            Command::Toggle {
                style,
                start: args.number("a selection start")?,
                end: args.number("a selection end")?,
            }
        }
        "insert" => Command::Insert {
            offset: args.number("an offset")?,
            text: args.text("the text to insert")?,
        },
        "delete" => Command::Delete {
            offset: args.number("an offset")?,
            len: args.number("a length")?,
        },
        "replace" => Command::Replace {
            offset: args.number("an offset")?,
            len: args.number("a length")?,
            text: args.text("the replacement text")?,
        },
        "bullet" => Command::Bullet(args.number("a caret offset")?),
        "numbered" => Command::Numbered(args.number("a caret offset")?),
        "checkbox" => Command::Checkbox(args.number("a caret offset")?),
        "indent" => Command::Indent(args.number("a caret offset")?),
        "outdent" => Command::Outdent(args.number("a caret offset")?),
        "clear-style" => Command::ClearStyle,
        _ => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: name,
            });
        }
    };
    args.finish()?;
    Ok(command)
}

struct Args {
    tokens: std::vec::IntoIter<String>,
    command: String,
    line: usize,
}

impl Args {
    fn text(&mut self, expected: &'static str) -> Result<String, ScriptError> {
        self.tokens.next().ok_or_else(|| ScriptError::MissingArgument {
            line: self.line,
            command: self.command.clone(),
            expected,
        })
    }

    fn number(&mut self, expected: &'static str) -> Result<usize, ScriptError> {
        let value = self.text(expected)?;
        value.parse().map_err(|_| ScriptError::InvalidNumber {
            line: self.line,
            value,
        })
    }

    fn finish(mut self) -> Result<(), ScriptError> {
        match self.tokens.next() {
            Some(extra) => Err(ScriptError::TrailingInput {
                line: self.line,
                command: self.command,
                extra,
            }),
            None => Ok(()),
        }
    }
}

/// Split on whitespace, keeping double-quoted strings (with `\n`, `\t`,
/// `\"` and `\\` escapes) as single tokens.
fn tokenize(line: &str, line_no: usize) -> Result<Vec<String>, ScriptError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    None => return Err(ScriptError::UnterminatedString { line: line_no }),
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => token.push('\n'),
                        Some('t') => token.push('\t'),
                        Some(other) => token.push(other),
                        None => return Err(ScriptError::UnterminatedString { line: line_no }),
                    },
                    Some(other) => token.push(other),
                }
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }
    Ok(tokens)
}
