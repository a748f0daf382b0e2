//! Sibling Partitioning
//!
//!     Repeated lists (band combinations, RAT containers, supported band lists) are rendered as a
//!     list header followed by N structurally identical entries, each entry starting at the same
//!     depth. One depth-boundary rule splits all of them:
//!
//!         1. The entry depth `d` is the depth of the line at index 1, the first line after the
//!            list header.
//!         2. From index 2 on, every line at exactly depth `d` closes the open chunk and opens
//!            the next one.
//!         3. The last open chunk runs to the end of the block.
//!
//!     Chunks are contiguous, ordered and cover the block exactly. The first chunk starts at
//!     index 0, so the header line travels with the first entry rather than being dropped; field
//!     readers skip it like any other line they do not recognize.
//!
//!     Feed this a block (see [extract_block](crate::capscan::subtree::extract_block)): with a
//!     header-less subtree, index 1 would be the first entry's first field and every field would
//!     become its own chunk.

use crate::capscan::error::{ExtractError, ExtractResult};
use crate::capscan::subtree::Subtree;

/// Cut a list block into its sibling entries.
pub fn partition_siblings<'a>(block: &Subtree<'a>) -> ExtractResult<Vec<Subtree<'a>>> {
    if block.len() < 2 {
        return Err(ExtractError::MalformedSubtree {
            start: block.start(),
            len: block.len(),
        });
    }

    let entry_depth = block[1].depth();
    let mut chunks = Vec::new();
    let mut chunk_start = 0;

    for (index, line) in block.iter().enumerate().skip(2) {
        if line.depth() == entry_depth {
            chunks.push(block.slice(chunk_start..index));
            chunk_start = index;
        }
    }
    chunks.push(block.slice(chunk_start..block.len()));

    log::trace!(
        "partitioned block at line {} into {} entr(ies) at depth {}",
        block.start(),
        chunks.len(),
        entry_depth
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capscan::line::Line;
    use crate::capscan::subtree::extract_block;
    use crate::capscan::testing::lines;

    fn texts<'a>(subtree: &Subtree<'a>) -> Vec<&'a str> {
        subtree.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn test_two_entries_under_list_header() {
        let source = lines(&[
            "  supportedBandCombinationList",
            "    BandCombination",
            "      bandEUTRA: 3",
            "      ca-BandwidthClassDL-EUTRA: a",
            "    BandCombination",
            "      bandNR: 78",
            "      ca-BandwidthClassDL-NR: a",
        ]);
        let chunks = partition_siblings(&Subtree::whole(&source)).expect("two entries");

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].start(), 0);
        assert_eq!(chunks[1].start(), 4);
        assert_eq!(
            texts(&chunks[1]),
            vec![
                "    BandCombination",
                "      bandNR: 78",
                "      ca-BandwidthClassDL-NR: a"
            ]
        );
    }

    #[test]
    fn test_chunks_cover_block_exactly() {
        let source = lines(&[
            "list",
            "  item",
            "    a: 1",
            "      nested: 2",
            "  item",
            "  item",
            "    b: 3",
        ]);
        let block = Subtree::whole(&source);
        let chunks = partition_siblings(&block).expect("entries");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), block.len());
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }

    #[test]
    fn test_single_entry() {
        let source = lines(&["list", "  only", "    a: 1"]);
        let chunks = partition_siblings(&Subtree::whole(&source)).expect("one entry");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }

    #[test]
    fn test_entries_of_flat_fields() {
        // Entries that are single lines, like a bare band list
        let source = lines(&["bands", "  1", "  3", "  7"]);
        let chunks = partition_siblings(&Subtree::whole(&source)).expect("entries");
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn test_too_short_is_malformed() {
        let source = lines(&["dump", "  supportedBandCombinationList"]);
        let block = extract_block(&source, 1);

        assert_eq!(
            partition_siblings(&block),
            Err(ExtractError::MalformedSubtree { start: 1, len: 1 })
        );
        assert!(partition_siblings(&Subtree::whole(&[])).is_err());
    }

    #[test]
    fn test_offsets_follow_the_parent_sequence() {
        let source = lines(&["msg", "  list", "    e", "      f: 1", "    e", "      f: 2"]);
        let block = extract_block(&source, 1);
        let chunks = partition_siblings(&block).expect("entries");

        assert_eq!(chunks[0].start(), 1);
        assert_eq!(chunks[1].start(), 4);
        assert_eq!(source[chunks[1].start()].text(), "    e");
    }
}
