//! Line Records
//!
//!     Every format assumption about what sits on a single line lives here. A line is parsed once
//!     into a [LineRecord] and nothing downstream splits lines on whitespace or counts columns.
//!
//! Line Families
//!
//!     Signaling exports use a handful of shapes, all covered by one declarative pattern:
//!
//!         - `key`                         a container header (`ue-CapabilityRAT-ContainerList`)
//!         - `key: value`                  a leaf (`bandEUTRA: 3`)
//!         - `key(index): value`           an indexed leaf (`FreqBandIndicator(0): 3`)
//!         - `key: value (annotation)`     a leaf with its encoded form (`rat-Type: eutra (0)`)
//!         - `key: (annotation)`           a leaf shown only in parentheses (`Mobile Country Code: (310)`)
//!         - `key (annotation)`            a header with a note (`featureSets (3 items)`)
//!
//!     The annotation is the trailing parenthesized group. Renderers put the raw enumerated or
//!     encoded value there, so [LineRecord::payload] falls back to it when the value itself is
//!     empty. Lines matching no family keep their trimmed text as key.

use crate::capscan::line::Line;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<indent> *)(?P<key>[^:()]*[^:()\s])(?:\((?P<index>\d+)\))?\s*(?::\s*(?P<value>.*)|\((?P<note>[^()]*)\))?\s*$",
    )
    .unwrap()
});

static TRAILING_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<value>.*?)\s*\((?P<annotation>[^()]*)\)$").unwrap());

/// A line split into depth, key, index, value and annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub depth: usize,
    pub key: &'a str,
    pub index: Option<u32>,
    pub value: Option<&'a str>,
    pub annotation: Option<&'a str>,
}

impl<'a> LineRecord<'a> {
    pub fn parse(line: &'a Line) -> Self {
        Self::parse_str(line.text())
    }

    pub fn parse_str(text: &'a str) -> Self {
        let depth = crate::capscan::line::indent_depth(text);
        let Some(caps) = LINE_PATTERN.captures(text) else {
            return LineRecord {
                depth,
                key: text.trim(),
                index: None,
                value: None,
                annotation: None,
            };
        };

        let key = caps.name("key").map_or("", |m| m.as_str());
        let index = caps
            .name("index")
            .and_then(|m| m.as_str().parse::<u32>().ok());
        let (value, annotation) = match (caps.name("value"), caps.name("note")) {
            (Some(raw), _) => split_annotation(raw.as_str().trim()),
            (None, Some(note)) => (None, non_empty(note.as_str().trim())),
            (None, None) => (None, None),
        };

        LineRecord {
            depth,
            key,
            index,
            value,
            annotation,
        }
    }

    /// The value, or the annotation when the value is empty.
    pub fn payload(&self) -> Option<&'a str> {
        self.value.or(self.annotation)
    }

    /// True for `name` itself and for release-suffixed variants such as `name-r15`.
    pub fn is_key_family(&self, name: &str) -> bool {
        match self.key.strip_prefix(name) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        }
    }
}

fn split_annotation(raw: &str) -> (Option<&str>, Option<&str>) {
    match TRAILING_ANNOTATION.captures(raw) {
        Some(caps) => {
            let value = caps.name("value").map_or("", |m| m.as_str());
            let annotation = caps.name("annotation").map_or("", |m| m.as_str());
            (non_empty(value.trim()), non_empty(annotation.trim()))
        }
        None => (non_empty(raw), None),
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
