//! JSON-with-comments parsing.
//!
//! Comments are blanked out in place (newlines kept, every other byte turned
//! into a space) so line and column numbers reported by `serde_json` still
//! point into the input text. Everything else is strict JSON: trailing
//! commas and unquoted keys are rejected.

use crate::error::ManifestError;
use serde_json::Value;

/// Parse JSONC text into a generic value. Purely syntactic.
pub fn parse_jsonc(text: &str) -> Result<Value, ManifestError> {
    let stripped = strip_comments(text)?;
    serde_json::from_str(&stripped).map_err(|e| {
        let full = e.to_string();
        let message = full
            .rsplit_once(" at line ")
            .map_or(full.as_str(), |(head, _)| head)
            .to_owned();
        ManifestError::Malformed {
            line: e.line(),
            column: e.column(),
            message,
        }
    })
}

#[derive(Clone, Copy)]
enum State {
    Code,
    Str { escaped: bool },
    LineComment,
    BlockComment { line: usize, column: usize },
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
}

fn strip_comments(text: &str) -> Result<String, ManifestError> {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();
    let (mut line, mut column) = (1usize, 1usize);

    while let Some(c) = chars.next() {
        let (start_line, start_column) = (line, column);
        let next = chars.peek().copied();
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += c.len_utf8();
        }

        state = match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    chars.next();
                    column += 1;
                    out.push_str("  ");
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    column += 1;
                    out.push_str("  ");
                    State::BlockComment {
                        line: start_line,
                        column: start_column,
                    }
                }
                ('"', _) => {
                    out.push(c);
                    State::Str { escaped: false }
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::Str { escaped } => {
                out.push(c);
                match c {
                    _ if escaped => State::Str { escaped: false },
                    '\\' => State::Str { escaped: true },
                    '"' => State::Code,
                    _ => State::Str { escaped: false },
                }
            }
            State::LineComment => {
                blank(&mut out, c);
                if c == '\n' {
                    State::Code
                } else {
                    State::LineComment
                }
            }
            State::BlockComment { .. } if c == '*' && next == Some('/') => {
                chars.next();
                column += 1;
                out.push_str("  ");
                State::Code
            }
            block @ State::BlockComment { .. } => {
                blank(&mut out, c);
                block
            }
        };
    }

    if let State::BlockComment { line, column } = state {
        return Err(ManifestError::Malformed {
            line,
            column,
            message: "unterminated block comment".to_owned(),
        });
    }
    Ok(out)
}
