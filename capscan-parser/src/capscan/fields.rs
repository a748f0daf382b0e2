//! Field Values
//!
//!     Capability tables are keyed by information element name. Instead of string-typed
//!     dictionaries, values are a small tagged union ([FieldValue]) held in a [FieldMap], so
//!     callers ask for a number or a flag and get `None` when the dump says something else.
//!
//! Lookup Rules
//!
//!     [find_field_value] is the single-leaf convenience built on the locator and the subtree
//!     extractor. It prefers an occurrence whose key is exactly the requested name and falls back
//!     to the first substring match. If the matching line has no value of its own, a header whose
//!     only child is a bare value line (no `key: value` shape, no children, like `'11111110'B`
//!     under `featureGroupIndicators`) takes that line as its value. Any other container has no
//!     value, so feature tables report it as [FieldValue::Absent].
//!
//!     Feature tables ([collect_fields], [collect_nested_fields]) only accept exact key matches:
//!     `ue-Category` must not be answered by `ue-CategoryDL-r12`.

use crate::capscan::line::Line;
use crate::capscan::locating::find_occurrences;
use crate::capscan::record::LineRecord;
use crate::capscan::subtree::extract_subtree;
use serde::Serialize;
use std::collections::BTreeMap;

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Numeric(i64),
    Boolean(bool),
    Text(String),
    Absent,
}

impl FieldValue {
    /// Classify raw value text: `true`/`false`, an integer, or anything else as text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => FieldValue::Boolean(true),
            "false" => FieldValue::Boolean(false),
            _ => raw
                .parse::<i64>()
                .map(FieldValue::Numeric)
                .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
        }
    }

    pub fn from_payload(payload: Option<&str>) -> Self {
        payload.map_or(FieldValue::Absent, FieldValue::parse)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

/// Field values keyed by element name, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn numeric(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

/// Payload of the line at `position`, or the bare value line rendered under it.
fn payload_at(lines: &[Line], position: usize) -> Option<&str> {
    let record = LineRecord::parse(&lines[position]);
    if let Some(payload) = record.payload() {
        return Some(payload);
    }
    match extract_subtree(lines, position).lines() {
        [only] => {
            let child = LineRecord::parse(only);
            match (child.index, child.payload()) {
                (None, None) => Some(child.key),
                _ => None,
            }
        }
        _ => None,
    }
}

fn position_of_key(lines: &[Line], name: &str) -> Option<usize> {
    find_occurrences(lines, name)
        .into_iter()
        .find(|&position| LineRecord::parse(&lines[position]).key == name)
}

/// Value of the first `field_name` leaf in `lines`.
pub fn find_field_value(lines: &[Line], field_name: &str) -> Option<String> {
    let position = position_of_key(lines, field_name)
        .or_else(|| find_occurrences(lines, field_name).first().copied())?;
    payload_at(lines, position).map(str::to_string)
}

/// One-line features: each name maps to its value, or [FieldValue::Absent] when missing.
pub fn collect_fields<S: AsRef<str>>(lines: &[Line], names: &[S]) -> FieldMap {
    let mut fields = FieldMap::new();
    for name in names {
        let name = name.as_ref();
        let value = position_of_key(lines, name)
            .map_or(FieldValue::Absent, |position| {
                FieldValue::from_payload(payload_at(lines, position))
            });
        log::trace!("feature {:?} = {:?}", name, value);
        fields.insert(name, value);
    }
    fields
}

/// Nested features: each name maps to the fields of its direct children, or `None` when the
/// element is missing or has no children.
pub fn collect_nested_fields<S: AsRef<str>>(
    lines: &[Line],
    names: &[S],
) -> BTreeMap<String, Option<FieldMap>> {
    let mut features = BTreeMap::new();
    for name in names {
        let name = name.as_ref();
        let children = position_of_key(lines, name)
            .map(|position| extract_subtree(lines, position))
            .filter(|subtree| !subtree.is_empty())
            .map(|subtree| {
                let child_depth = subtree.depth().unwrap_or_default();
                let mut fields = FieldMap::new();
                for record in subtree.iter().map(LineRecord::parse) {
                    if record.depth == child_depth && fields.get(record.key).is_none() {
                        fields.insert(record.key, FieldValue::from_payload(record.payload()));
                    }
                }
                fields
            });
        features.insert(name.to_string(), children);
    }
    features
}
