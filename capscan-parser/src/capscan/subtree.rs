//! Subtree Extraction
//!
//!     A renderer never emits a deeper line that is not a descendant of the nearest shallower
//!     line above it. That single convention is all we need to recover "everything nested under"
//!     an occurrence without any grammar.
//!
//! Subtrees and Blocks
//!
//!     A [Subtree] always starts at the occurrence's first child; it never contains the header
//!     line itself. The occurrence line followed by its subtree is a block, which is what
//!     [partition_siblings](crate::capscan::siblings::partition_siblings) expects: a one-line list
//!     header and then the entries. Both are the same type (a borrowed view plus its offset), the
//!     difference is only where the view starts.
//!
//! Boundary Rule
//!
//!     The reference depth is the depth of the line right after the occurrence, the first child.
//!     The subtree is the longest run from there whose lines are all at least that deep; it ends
//!     at the first shallower line or at the end of input.
//!
//!     If the line after the occurrence is not strictly deeper than the occurrence, the occurrence
//!     is a leaf and its subtree is empty. Without this, a leaf header would swallow its following
//!     siblings.

use crate::capscan::line::Line;
use crate::capscan::locating::find_occurrences;
use std::ops::{Deref, Range};

/// A contiguous view into a line sequence, remembering where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subtree<'a> {
    lines: &'a [Line],
    start: usize,
}

impl<'a> Subtree<'a> {
    /// View `lines`, which begin at `start` in their parent sequence.
    pub fn new(lines: &'a [Line], start: usize) -> Self {
        Subtree { lines, start }
    }

    /// View a whole sequence.
    pub fn whole(lines: &'a [Line]) -> Self {
        Subtree::new(lines, 0)
    }

    fn empty_at(lines: &'a [Line], position: usize) -> Self {
        let position = position.min(lines.len());
        Subtree::new(&lines[position..position], position)
    }

    pub fn lines(&self) -> &'a [Line] {
        self.lines
    }

    /// Position of the first line in the parent sequence.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Position one past the last line in the parent sequence.
    pub fn end(&self) -> usize {
        self.start + self.lines.len()
    }

    /// Depth of the first line, if any.
    pub fn depth(&self) -> Option<usize> {
        self.lines.first().map(Line::depth)
    }

    /// Sub-view for a range relative to this view. Offsets stay relative to the parent.
    pub fn slice(&self, range: Range<usize>) -> Subtree<'a> {
        let start = self.start + range.start;
        Subtree::new(&self.lines[range], start)
    }

    /// The lines joined back with newlines, indentation untouched.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Deref for Subtree<'_> {
    type Target = [Line];

    fn deref(&self) -> &Self::Target {
        self.lines
    }
}

/// Lines nested under the occurrence at `position`, starting at its first child.
pub fn extract_subtree(lines: &[Line], position: usize) -> Subtree<'_> {
    let first = position.saturating_add(1);
    if first >= lines.len() {
        return Subtree::empty_at(lines, first);
    }

    let reference = lines[first].depth();
    if reference <= lines[position].depth() {
        return Subtree::empty_at(lines, first);
    }

    let end = lines[first..]
        .iter()
        .position(|line| line.depth() < reference)
        .map_or(lines.len(), |offset| first + offset);

    Subtree::new(&lines[first..end], first)
}

/// The occurrence line at `position` followed by its subtree.
pub fn extract_block(lines: &[Line], position: usize) -> Subtree<'_> {
    if position >= lines.len() {
        return Subtree::empty_at(lines, position);
    }
    let end = extract_subtree(lines, position).end().max(position + 1);
    Subtree::new(&lines[position..end], position)
}

/// The subtree under every occurrence of `marker`, in order.
pub fn find_subtrees<'a>(lines: &'a [Line], marker: &str) -> Vec<Subtree<'a>> {
    find_occurrences(lines, marker)
        .into_iter()
        .map(|position| extract_subtree(lines, position))
        .collect()
}

/// The block (header plus subtree) of every occurrence of `marker`, in order.
pub fn find_blocks<'a>(lines: &'a [Line], marker: &str) -> Vec<Subtree<'a>> {
    find_occurrences(lines, marker)
        .into_iter()
        .map(|position| extract_block(lines, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capscan::testing::lines;

    fn texts<'a>(subtree: &Subtree<'a>) -> Vec<&'a str> {
        subtree.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn test_subtree_runs_to_end_of_input() {
        let source = lines(&["root", "  a: 1", "  sub", "    b: 2", "  c: 3"]);
        let subtree = extract_subtree(&source, 0);

        assert_eq!(texts(&subtree), vec!["  a: 1", "  sub", "    b: 2", "  c: 3"]);
        assert_eq!(subtree.start(), 1);
        assert_eq!(subtree.end(), 5);
    }

    #[test]
    fn test_subtree_stops_at_shallower_line() {
        let source = lines(&["msg", "  list", "    x: 1", "    y: 2", "  after", "tail"]);
        let subtree = extract_subtree(&source, 1);

        assert_eq!(texts(&subtree), vec!["    x: 1", "    y: 2"]);
        assert_eq!(source[subtree.end()].text(), "  after");
    }

    #[test]
    fn test_reference_is_first_child_depth() {
        // A line between the header depth and the first child depth ends the subtree
        let source = lines(&["header", "    deep: 1", "  mid: 2", "    deep: 3"]);
        let subtree = extract_subtree(&source, 0);

        assert_eq!(texts(&subtree), vec!["    deep: 1"]);
    }

    #[test]
    fn test_leaf_occurrence_has_empty_subtree() {
        let source = lines(&["  ue-Category: 4", "  halfDuplex: false"]);
        let subtree = extract_subtree(&source, 0);

        assert!(subtree.is_empty());
        assert_eq!(subtree.start(), 1);
    }

    #[test]
    fn test_last_line_has_empty_subtree() {
        let source = lines(&["a", "  b"]);
        assert!(extract_subtree(&source, 1).is_empty());
        assert!(extract_subtree(&source, 5).is_empty());
    }

    #[test]
    fn test_blank_line_ends_subtree() {
        let source = lines(&["a", "  b", "", "  c"]);
        assert_eq!(texts(&extract_subtree(&source, 0)), vec!["  b"]);
    }

    #[test]
    fn test_block_includes_header() {
        let source = lines(&["root", "  a: 1", "  sub", "    b: 2", "  c: 3"]);
        let block = extract_block(&source, 0);

        insta::assert_snapshot!(block.render(), @r"
        root
          a: 1
          sub
            b: 2
          c: 3
        ");
        assert_eq!(block.start(), 0);
    }

    #[test]
    fn test_block_of_leaf_is_the_line_itself() {
        let source = lines(&["a: 1", "b: 2"]);
        let block = extract_block(&source, 1);

        assert_eq!(texts(&block), vec!["b: 2"]);
        assert!(extract_block(&source, 2).is_empty());
    }

    #[test]
    fn test_find_subtrees_per_occurrence() {
        let source = lines(&[
            "pdcp-Parameters",
            "  supportedROHC-Profiles",
            "    profile0x0001: true",
            "phyLayerParameters",
            "  supportedROHC-Profiles",
            "    profile0x0002: false",
        ]);
        let subtrees = find_subtrees(&source, "supportedROHC-Profiles");

        assert_eq!(subtrees.len(), 2);
        assert_eq!(texts(&subtrees[0]), vec!["    profile0x0001: true"]);
        assert_eq!(texts(&subtrees[1]), vec!["    profile0x0002: false"]);

        let blocks = find_blocks(&source, "supportedROHC-Profiles");
        assert_eq!(blocks[1].start(), 4);
        assert_eq!(blocks[1].len(), 2);
    }

    #[test]
    fn test_slice_keeps_parent_offsets() {
        let source = lines(&["a", "  b", "  c", "  d"]);
        let subtree = extract_subtree(&source, 0);
        let tail = subtree.slice(1..3);

        assert_eq!(tail.start(), 2);
        assert_eq!(texts(&tail), vec!["  c", "  d"]);
    }
}
