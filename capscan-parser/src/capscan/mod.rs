//! Main module for capscan library functionality

pub mod capability;
pub mod combos;
pub mod error;
pub mod fields;
pub mod line;
pub mod locating;
pub mod record;
pub mod rlf;
pub mod segmenting;
pub mod siblings;
pub mod subtree;
pub mod testing;

pub use capability::{CapabilityExtractor, CapabilityReport, ExtractionSettings};
pub use combos::{encode_band_combo, endc_combos, BandCombo, ComboEncoder};
pub use error::{ExtractError, ExtractResult};
pub use fields::{collect_fields, collect_nested_fields, find_field_value, FieldMap, FieldValue};
pub use line::{indent_depth, lines_from_bytes, lines_from_text, Line};
pub use locating::{find_instances_containing, find_occurrences};
pub use record::LineRecord;
pub use rlf::{find_radio_link_failures, RlfCause, RlfFinding, RlfKind};
pub use segmenting::{split_into_instances, Instances, MessageInstance};
pub use siblings::partition_siblings;
pub use subtree::{extract_block, extract_subtree, find_blocks, find_subtrees, Subtree};
