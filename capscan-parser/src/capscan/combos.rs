//! Band Combination Encoding
//!
//!     A band combination entry lists, per radio access technology, band numbers each followed
//!     by its bandwidth class. Entries fold into the 3GPP style identifier used on test plans:
//!
//!         DC_3A-7A_n78A      LTE 3 class A + LTE 7 class A, NR n78 class A
//!
//!     LTE parts come first with no prefix, NR parts carry an `n`; parts within a section are
//!     joined with `-`, sections with `_`.
//!
//! Per-Entry State Machine
//!
//!     BeforeLte ──first LTE band──> InLte ──first NR band──> InNr
//!         └──────────────first NR band─────────────────────────┘
//!
//!     The entry ends when its lines run out; an entry still in BeforeLte yields nothing.
//!
//!     A band field must be directly followed by a bandwidth class field. Anything else is left
//!     alone: dumps carry vendor annotations, `featureSetCombination` counters and so on. A band
//!     that cannot be read (non-numeric, no class after it) or an LTE band once the NR section
//!     has started is an unrecognized field: logged and skipped, never fatal.
//!
//!     Identifiers are collected into a set. Two entries that differ only in fields we ignore
//!     (feature set indices, typically) normalize to the same identifier and count once.

use crate::capscan::error::{ExtractError, ExtractResult};
use crate::capscan::line::Line;
use crate::capscan::locating::{find_instances_containing, find_occurrences};
use crate::capscan::record::LineRecord;
use crate::capscan::siblings::partition_siblings;
use crate::capscan::subtree::{extract_block, Subtree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Marker of the message section holding MR-DC band combinations.
pub const MRDC_MARKER: &str = "rf-ParametersMRDC";
/// Marker of the band combination list itself.
pub const COMBINATION_LIST_MARKER: &str = "supportedBandCombinationList";

const COMBO_PREFIX: &str = "DC_";
const NR_PREFIX: char = 'n';

/// One band of a combination: band number plus bandwidth class (`3A`, `n78A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandEntry {
    pub band: u16,
    pub class: String,
}

impl BandEntry {
    pub fn new(band: u16, class: &str) -> Self {
        BandEntry {
            band,
            class: capitalize(class),
        }
    }
}

impl fmt::Display for BandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.band, self.class)
    }
}

/// An EN-DC (or single RAT) band combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BandCombo {
    pub lte: Vec<BandEntry>,
    pub nr: Vec<BandEntry>,
}

impl BandCombo {
    pub fn is_empty(&self) -> bool {
        self.lte.is_empty() && self.nr.is_empty()
    }
}

impl fmt::Display for BandCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(COMBO_PREFIX)?;
        let lte: Vec<String> = self.lte.iter().map(BandEntry::to_string).collect();
        f.write_str(&lte.join("-"))?;
        if !self.lte.is_empty() && !self.nr.is_empty() {
            f.write_str("_")?;
        }
        let nr: Vec<String> = self
            .nr
            .iter()
            .map(|entry| format!("{}{}", NR_PREFIX, entry))
            .collect();
        f.write_str(&nr.join("-"))
    }
}

/// Errors that can occur when reading a combination identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboParseError {
    MissingPrefix(String),
    InvalidBand(String),
    TooManySections(String),
    MixedSection(String),
    MisplacedSection(String),
}

impl fmt::Display for ComboParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboParseError::MissingPrefix(s) => {
                write!(f, "combination '{}' does not start with {}", s, COMBO_PREFIX)
            }
            ComboParseError::InvalidBand(s) => write!(f, "invalid band entry '{}'", s),
            ComboParseError::TooManySections(s) => {
                write!(f, "combination '{}' has more than an LTE and an NR section", s)
            }
            ComboParseError::MixedSection(s) => {
                write!(f, "section '{}' mixes LTE and NR bands", s)
            }
            ComboParseError::MisplacedSection(s) => {
                write!(f, "combination '{}' must list its LTE section before its NR section", s)
            }
        }
    }
}

impl std::error::Error for ComboParseError {}

impl FromStr for BandCombo {
    type Err = ComboParseError;

    /// Reads `DC_3A-7A_n78A` back into its LTE and NR sections.
    ///
    /// A lone section may be all LTE or all NR; with two sections the LTE one comes first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(COMBO_PREFIX)
            .ok_or_else(|| ComboParseError::MissingPrefix(s.to_string()))?;
        let sections: Vec<&str> = body.split('_').collect();

        let mut combo = BandCombo::default();
        match sections.as_slice() {
            [""] => {}
            [single] => match parse_section(single)? {
                (Rat::Lte, entries) => combo.lte = entries,
                (Rat::Nr, entries) => combo.nr = entries,
            },
            [first, second] => match (parse_section(first)?, parse_section(second)?) {
                ((Rat::Lte, lte), (Rat::Nr, nr)) => {
                    combo.lte = lte;
                    combo.nr = nr;
                }
                _ => return Err(ComboParseError::MisplacedSection(s.to_string())),
            },
            _ => return Err(ComboParseError::TooManySections(s.to_string())),
        }
        Ok(combo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rat {
    Lte,
    Nr,
}

/// One `-`-joined section; every part must belong to the same RAT.
fn parse_section(section: &str) -> Result<(Rat, Vec<BandEntry>), ComboParseError> {
    let mut rat = None;
    let mut entries = Vec::new();
    for part in section.split('-') {
        let (part_rat, entry) = match part.strip_prefix(NR_PREFIX) {
            Some(nr) => (Rat::Nr, parse_band_entry(nr, part)?),
            None => (Rat::Lte, parse_band_entry(part, part)?),
        };
        if rat.is_some_and(|rat| rat != part_rat) {
            return Err(ComboParseError::MixedSection(section.to_string()));
        }
        rat = Some(part_rat);
        entries.push(entry);
    }
    // split always yields a part, and an empty part fails parse_band_entry
    let rat = rat.ok_or_else(|| ComboParseError::InvalidBand(section.to_string()))?;
    Ok((rat, entries))
}

fn parse_band_entry(text: &str, original: &str) -> Result<BandEntry, ComboParseError> {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    let (band, class) = text.split_at(digits);
    let band = band
        .parse::<u16>()
        .map_err(|_| ComboParseError::InvalidBand(original.to_string()))?;
    if class.is_empty() || !class.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ComboParseError::InvalidBand(original.to_string()));
    }
    Ok(BandEntry::new(band, class))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    BeforeLte,
    InLte,
    InNr,
}

/// Field names the encoder recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboEncoder {
    /// Key of LTE band fields; release suffixes (`-r10`) also match.
    pub lte_band_field: String,
    /// Key of NR band fields; release suffixes also match.
    pub nr_band_field: String,
    /// Case-insensitive fragment identifying a bandwidth class key.
    pub bandwidth_class_field: String,
}

impl Default for ComboEncoder {
    fn default() -> Self {
        ComboEncoder {
            lte_band_field: "bandEUTRA".to_string(),
            nr_band_field: "bandNR".to_string(),
            bandwidth_class_field: "bandwidthClass".to_string(),
        }
    }
}

impl ComboEncoder {
    fn rat_of(&self, record: &LineRecord) -> Option<Rat> {
        if record.is_key_family(&self.lte_band_field) {
            Some(Rat::Lte)
        } else if record.is_key_family(&self.nr_band_field) {
            Some(Rat::Nr)
        } else {
            None
        }
    }

    fn is_class_field(&self, record: &LineRecord) -> bool {
        record
            .key
            .to_ascii_lowercase()
            .contains(&self.bandwidth_class_field.to_ascii_lowercase())
    }

    /// Read the band at `index` of `entry` together with the class on the following line.
    fn read_band(
        &self,
        entry: &Subtree,
        index: usize,
        record: &LineRecord,
    ) -> ExtractResult<BandEntry> {
        let unrecognized = || ExtractError::UnrecognizedField {
            line: entry.start() + index,
            key: record.key.to_string(),
        };
        let band = record
            .payload()
            .and_then(|value| value.parse::<u16>().ok())
            .ok_or_else(unrecognized)?;
        let class = entry
            .get(index + 1)
            .map(LineRecord::parse)
            .filter(|next| self.is_class_field(next))
            .and_then(|next| next.payload())
            .and_then(|value| value.split_whitespace().next())
            .ok_or_else(unrecognized)?;
        Ok(BandEntry::new(band, class))
    }

    /// Fold one sibling entry. Entries without any readable band give `None`.
    pub fn encode_entry(&self, entry: &Subtree) -> Option<BandCombo> {
        let mut combo = BandCombo::default();
        let mut section = Section::BeforeLte;

        for (index, line) in entry.iter().enumerate() {
            let record = LineRecord::parse(line);
            let Some(rat) = self.rat_of(&record) else {
                continue;
            };

            let band = match (section, rat) {
                (Section::InNr, Rat::Lte) => Err(ExtractError::UnrecognizedField {
                    line: entry.start() + index,
                    key: record.key.to_string(),
                }),
                _ => self.read_band(entry, index, &record),
            };
            let band = match band {
                Ok(band) => band,
                Err(err) => {
                    log::debug!("skipping field: {}", err);
                    continue;
                }
            };

            match rat {
                Rat::Lte => {
                    section = Section::InLte;
                    combo.lte.push(band);
                }
                Rat::Nr => {
                    section = Section::InNr;
                    combo.nr.push(band);
                }
            }
        }

        match section {
            Section::BeforeLte => None,
            Section::InLte | Section::InNr => Some(combo),
        }
    }

    /// Identifiers of every entry in a sibling group, deduplicated.
    pub fn encode(&self, group: &[Subtree]) -> BTreeSet<String> {
        group
            .iter()
            .filter_map(|entry| self.encode_entry(entry))
            .map(|combo| combo.to_string())
            .collect()
    }

    /// EN-DC combinations declared anywhere in a dump.
    ///
    /// Uses the first combination list of every message carrying MR-DC parameters; identical
    /// lists (the UE repeats its capabilities on every enquiry) are encoded once.
    pub fn endc_combos(&self, lines: &[Line]) -> ExtractResult<BTreeSet<String>> {
        let instances = find_instances_containing(lines, MRDC_MARKER);
        if instances.is_empty() {
            return Err(ExtractError::not_found(MRDC_MARKER));
        }

        let mut blocks: Vec<Subtree> = Vec::new();
        for instance in &instances {
            let occurrences = find_occurrences(instance.lines(), COMBINATION_LIST_MARKER);
            let Some(&position) = occurrences.first() else {
                log::debug!(
                    "message at line {} has no {}",
                    instance.start() + 1,
                    COMBINATION_LIST_MARKER
                );
                continue;
            };
            let block = extract_block(instance.lines(), position);
            if block.len() < 2 {
                log::debug!(
                    "combination list at line {} has no entries",
                    instance.start() + position + 1
                );
                continue;
            }
            if blocks.iter().any(|seen| seen.lines() == block.lines()) {
                log::debug!(
                    "duplicate combination list at line {}",
                    instance.start() + position + 1
                );
                continue;
            }
            blocks.push(Subtree::new(block.lines(), instance.start() + block.start()));
        }
        if blocks.is_empty() {
            return Err(ExtractError::not_found(COMBINATION_LIST_MARKER));
        }

        let mut combos = BTreeSet::new();
        for block in &blocks {
            let group = partition_siblings(block)?;
            combos.extend(self.encode(&group));
        }
        log::debug!("{} distinct EN-DC combination(s)", combos.len());
        Ok(combos)
    }
}

/// Identifiers of every entry in a sibling group, with the standard field names.
pub fn encode_band_combo(group: &[Subtree]) -> BTreeSet<String> {
    ComboEncoder::default().encode(group)
}

/// EN-DC combinations declared anywhere in a dump, read with `encoder`'s field names.
pub fn endc_combos(lines: &[Line], encoder: &ComboEncoder) -> ExtractResult<BTreeSet<String>> {
    encoder.endc_combos(lines)
}
