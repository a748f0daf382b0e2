//! Lines and Depth
//!
//!     A dump is nothing but lines. Each line's nesting level is the number of leading spaces
//!     before its first non-space character, which we call its depth. Depth is derived from the
//!     text every time it is asked for: lines are never mutated, only sliced, so there is nothing
//!     to keep in sync.
//!
//!     Tabs are not indentation here. Renderers that mix tabs and spaces produce depths that
//!     mean nothing, and we do not try to repair them.
//!
//! Ingestion
//!
//!     [lines_from_text] trusts its input. [lines_from_bytes] is the guarded entry point for
//!     content read straight from disk or a pipe: it rejects invalid UTF-8 and control characters,
//!     which only show up when a binary log container was fed in instead of its text export.

use crate::capscan::error::{ExtractError, ExtractResult};
use serde::Serialize;
use std::fmt;

/// Count of leading space characters, or the full length for an all-space line.
pub fn indent_depth(text: &str) -> usize {
    text.bytes().take_while(|byte| *byte == b' ').count()
}

/// One line of a dump, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Line(String);

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Line(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// The nesting depth of this line (leading spaces).
    pub fn depth(&self) -> usize {
        indent_depth(&self.0)
    }

    /// The line without its indentation and trailing whitespace.
    pub fn content(&self) -> &str {
        self.0.trim()
    }

    /// True only for an exactly empty line; whitespace-only lines are not separators.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(marker)
    }

    /// Depth of the line, refusing lines that carry control characters.
    ///
    /// `index` is the line's position in its sequence and is only used for the error.
    pub fn checked_depth(&self, index: usize) -> ExtractResult<usize> {
        check_text(&self.0).map_err(|reason| ExtractError::InputEncoding {
            line: index,
            reason,
        })?;
        Ok(self.depth())
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::new(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line(text)
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split text into lines, dropping `\n` / `\r\n` terminators.
pub fn lines_from_text(text: &str) -> Vec<Line> {
    text.lines().map(Line::from).collect()
}

/// Split raw bytes into lines, rejecting content that is not a text dump.
pub fn lines_from_bytes(bytes: &[u8]) -> ExtractResult<Vec<Line>> {
    let mut raw_lines: Vec<&[u8]> = bytes.split(|byte| *byte == b'\n').collect();
    // A terminating newline does not open another line
    if raw_lines.last().is_some_and(|last| last.is_empty()) {
        raw_lines.pop();
    }

    raw_lines
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let text = std::str::from_utf8(raw).map_err(|err| ExtractError::InputEncoding {
                line: index,
                reason: format!("invalid UTF-8 at byte {}", err.valid_up_to()),
            })?;
            let line = Line::new(text);
            line.checked_depth(index)?;
            Ok(line)
        })
        .collect()
}

fn check_text(text: &str) -> Result<(), String> {
    match text
        .chars()
        .enumerate()
        .find(|(_, c)| c.is_control() && *c != '\t')
    {
        Some((column, c)) => Err(format!(
            "control character U+{:04X} at column {}",
            c as u32,
            column + 1
        )),
        None => Ok(()),
    }
}
