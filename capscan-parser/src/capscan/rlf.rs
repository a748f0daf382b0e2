//! Radio Link Failure Scan
//!
//!     A device that lost its radio link leaves a few recognizable elements behind:
//!
//!         - `reestablishmentCause`        the re-establishment request after the failure
//!         - `rlf-InfoAvailable-rNN: true` the device tells the network it kept a report
//!         - `rlf-Report-r9`               the report itself, in a UE information response
//!         - `rlf-Cause-rNN`               why the link failed, inside the report
//!         - `scgFailureInformationNR`     the NR secondary cell group failed (EN-DC)
//!
//!     Each message contributes at most one finding of each kind, at the first line that shows
//!     it: a message body repeats its own name in nested headers. `rlf-InfoAvailable: false` is
//!     not a failure.

use crate::capscan::line::Line;
use crate::capscan::locating::find_instances_containing;
use crate::capscan::record::LineRecord;
use serde::Serialize;
use std::fmt;

/// What a finding shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RlfKind {
    Reestablishment,
    InfoAvailable,
    Report,
    Cause,
    ScgFailure,
}

impl RlfKind {
    const ALL: [RlfKind; 5] = [
        RlfKind::Reestablishment,
        RlfKind::InfoAvailable,
        RlfKind::Report,
        RlfKind::Cause,
        RlfKind::ScgFailure,
    ];

    /// Element family whose presence marks this kind.
    fn marker(self) -> &'static str {
        match self {
            RlfKind::Reestablishment => "reestablishmentCause",
            RlfKind::InfoAvailable => "rlf-InfoAvailable",
            RlfKind::Report => "rlf-Report-r9",
            RlfKind::Cause => "rlf-Cause",
            RlfKind::ScgFailure => "scgFailureInformationNR",
        }
    }

    fn matches(self, record: &LineRecord) -> bool {
        if !record.is_key_family(self.marker()) {
            return false;
        }
        match self {
            RlfKind::InfoAvailable => record.payload() == Some("true"),
            _ => true,
        }
    }

    fn carries_cause(self) -> bool {
        matches!(self, RlfKind::Reestablishment | RlfKind::Cause)
    }
}

impl fmt::Display for RlfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RlfKind::Reestablishment => "re-establishment request",
            RlfKind::InfoAvailable => "rlf info available",
            RlfKind::Report => "rlf report",
            RlfKind::Cause => "rlf cause",
            RlfKind::ScgFailure => "scg failure",
        };
        f.write_str(name)
    }
}

/// Failure cause read from `rlf-Cause` or `reestablishmentCause`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RlfCause {
    T310Expiry,
    RandomAccessProblem,
    RlcMaxNumRetx,
    OtherFailure,
    Other(String),
}

impl RlfCause {
    /// Classify an enumerated value, release suffix and all (`t310-Expiry-r11`).
    pub fn classify(value: &str) -> Self {
        if value.starts_with("t310") {
            RlfCause::T310Expiry
        } else if value.starts_with("randomAccessProblem") {
            RlfCause::RandomAccessProblem
        } else if value.starts_with("rlc-MaxNumRetx") {
            RlfCause::RlcMaxNumRetx
        } else if value.starts_with("otherFailure") || value.starts_with("other-failure") {
            RlfCause::OtherFailure
        } else {
            RlfCause::Other(value.to_string())
        }
    }
}

impl fmt::Display for RlfCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlfCause::T310Expiry => f.write_str("t310-Expiry"),
            RlfCause::RandomAccessProblem => f.write_str("randomAccessProblem"),
            RlfCause::RlcMaxNumRetx => f.write_str("rlc-MaxNumRetx"),
            RlfCause::OtherFailure => f.write_str("otherFailure"),
            RlfCause::Other(value) => f.write_str(value),
        }
    }
}

/// One sign of a radio link failure. `line` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RlfFinding {
    pub line: usize,
    pub kind: RlfKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<RlfCause>,
}

impl fmt::Display for RlfFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line + 1, self.kind)?;
        match &self.cause {
            Some(cause) => write!(f, " ({})", cause),
            None => Ok(()),
        }
    }
}

/// Every radio link failure sign in a dump, in line order.
pub fn find_radio_link_failures(lines: &[Line]) -> Vec<RlfFinding> {
    let mut findings = Vec::new();
    for kind in RlfKind::ALL {
        for instance in find_instances_containing(lines, kind.marker()) {
            let found = instance.iter().enumerate().find_map(|(offset, line)| {
                let record = LineRecord::parse(line);
                kind.matches(&record).then_some((offset, record))
            });
            let Some((offset, record)) = found else {
                continue;
            };
            let cause = if kind.carries_cause() {
                record.payload().map(RlfCause::classify)
            } else {
                None
            };
            findings.push(RlfFinding {
                line: instance.start() + offset,
                kind,
                cause,
            });
        }
    }
    findings.sort_by_key(|finding| (finding.line, finding.kind));
    log::debug!("{} radio link failure sign(s)", findings.len());
    findings
}
