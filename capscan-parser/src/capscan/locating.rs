//! Occurrence Locator
//!
//!     Finds lines of interest by plain substring match: case-sensitive, unanchored, in input
//!     order and without deduplication. A marker is usually an information element name
//!     (`supportedBandCombinationList`) or a message name (`ueCapabilityInformation`).
//!
//!     Positions are indices into the exact slice that was searched. A position obtained from a
//!     subtree is relative to that subtree, never to the whole dump.
//!
//!     No match is an empty result, not an error: callers branch on "feature absent" themselves.

use crate::capscan::line::Line;
use crate::capscan::segmenting::{split_into_instances, MessageInstance};

/// Positions of every line containing `marker`.
pub fn find_occurrences(lines: &[Line], marker: &str) -> Vec<usize> {
    let positions: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(marker))
        .map(|(position, _)| position)
        .collect();
    log::trace!("marker {:?}: {} occurrence(s)", marker, positions.len());
    positions
}

/// Every message instance with at least one line containing `marker`.
///
/// An instance is returned once no matter how many of its lines match.
pub fn find_instances_containing<'a>(lines: &'a [Line], marker: &str) -> Vec<MessageInstance<'a>> {
    let instances: Vec<_> = split_into_instances(lines)
        .filter(|instance| instance.contains(marker))
        .collect();
    log::debug!(
        "marker {:?}: found in {} message instance(s)",
        marker,
        instances.len()
    );
    instances
}
