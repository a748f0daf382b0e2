//! # capscan
//!
//! Extraction engine for indentation-formatted protocol dumps.
//!
//! Radio capability reports (and most other RRC/NAS signaling) come out of vendor log tools as
//! text where every information element sits on its own line and nesting is nothing but leading
//! spaces. There is no grammar to lean on, so everything here works from depth alone.
//!
//! File Layout
//!
//! src/capscan
//!   ├── line         Lines, depth measurement and ingestion guards
//!   ├── record       The one place where a line's `key(index): value (annotation)` shape is parsed
//!   ├── segmenting   Message instances (blank-line separated)
//!   ├── locating     Marker occurrences
//!   ├── subtree      Subtrees and blocks under an occurrence
//!   ├── siblings     Repeated-list partitioning
//!   ├── fields       Typed field values and feature tables
//!   ├── combos       Band combination encoding
//!   ├── capability   Capability report assembly
//!   ├── rlf          Radio link failure scan
//!   └── testing      Verified sample dumps and line factories
//!
//! For testing guidelines, see the [testing module](capscan::testing).

#![allow(rustdoc::invalid_html_tags)]

pub mod capscan;
