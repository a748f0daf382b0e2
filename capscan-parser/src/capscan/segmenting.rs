//! Message Instances
//!
//!     A signaling export is a sequence of messages, each a contiguous run of lines, separated by
//!     exactly empty lines. A message instance is the run strictly between two separators, so
//!     runs of blank lines (including at the start or end of the dump) never produce an empty
//!     instance. A dump without any blank line is a single instance.
//!
//!     Splitting is lazy: [Instances] walks the slice on demand and hands out borrowed views, so
//!     callers that only need the first matching message never scan the rest of the file.
//!     Instances are independent of each other, which makes them the natural unit for callers that
//!     want to fan work out.

use crate::capscan::line::Line;
use std::ops::Deref;

/// One blank-line delimited message of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInstance<'a> {
    lines: &'a [Line],
    start: usize,
}

impl<'a> MessageInstance<'a> {
    pub fn lines(&self) -> &'a [Line] {
        self.lines
    }

    /// Position of the first line within the sequence that was split.
    pub fn start(&self) -> usize {
        self.start
    }

    /// True when any line of the instance contains `marker`.
    pub fn contains(&self, marker: &str) -> bool {
        self.lines.iter().any(|line| line.contains(marker))
    }
}

impl Deref for MessageInstance<'_> {
    type Target = [Line];

    fn deref(&self) -> &Self::Target {
        self.lines
    }
}

/// Lazy iterator over the message instances of a line sequence.
#[derive(Debug, Clone)]
pub struct Instances<'a> {
    lines: &'a [Line],
    cursor: usize,
}

impl<'a> Iterator for Instances<'a> {
    type Item = MessageInstance<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.lines.len() && self.lines[self.cursor].is_blank() {
            self.cursor += 1;
        }
        if self.cursor >= self.lines.len() {
            return None;
        }

        let start = self.cursor;
        while self.cursor < self.lines.len() && !self.lines[self.cursor].is_blank() {
            self.cursor += 1;
        }

        Some(MessageInstance {
            lines: &self.lines[start..self.cursor],
            start,
        })
    }
}

/// Split a dump into its message instances.
pub fn split_into_instances(lines: &[Line]) -> Instances<'_> {
    Instances { lines, cursor: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capscan::testing::lines;

    fn texts<'a>(instance: &MessageInstance<'a>) -> Vec<&'a str> {
        instance.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn test_split_on_blank_lines() {
        let source = lines(&["a", "  b", "", "c", "", "", "d"]);
        let instances: Vec<_> = split_into_instances(&source).collect();

        assert_eq!(instances.len(), 3);
        assert_eq!(texts(&instances[0]), vec!["a", "  b"]);
        assert_eq!(texts(&instances[1]), vec!["c"]);
        assert_eq!(texts(&instances[2]), vec!["d"]);
        assert_eq!(instances[2].start(), 6);
    }

    #[test]
    fn test_leading_and_trailing_blanks_produce_nothing() {
        let source = lines(&["", "", "a", "", ""]);
        let instances: Vec<_> = split_into_instances(&source).collect();

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].start(), 2);
    }

    #[test]
    fn test_no_blank_lines_is_one_instance() {
        let source = lines(&["a", "b", "c"]);
        assert_eq!(split_into_instances(&source).count(), 1);
    }

    #[test]
    fn test_whitespace_only_line_does_not_separate() {
        let source = lines(&["a", "   ", "b"]);
        assert_eq!(split_into_instances(&source).count(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(split_into_instances(&[]).count(), 0);
        assert_eq!(split_into_instances(&lines(&["", ""])).count(), 0);
    }
}
