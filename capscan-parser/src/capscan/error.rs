//! Error types for extraction operations
//!
//!     Absence is not an error at the engine level: locating a marker that is not there returns
//!     an empty result. Only the report assembly, which needs certain messages to exist, turns
//!     absence into [ExtractError::NotFound]. Every error is local to the call that raised it.

use std::fmt;

/// Errors that can occur while extracting data from a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// A marker the caller requires has no occurrence in the dump
    NotFound { marker: String },
    /// A block is too short to tell where its sibling entries start
    MalformedSubtree { start: usize, len: usize },
    /// A field the encoder cannot place in any RAT section. Never escapes the encoder.
    UnrecognizedField { line: usize, key: String },
    /// A line that cannot be given a depth (binary or non-UTF-8 content)
    InputEncoding { line: usize, reason: String },
}

impl ExtractError {
    pub fn not_found(marker: impl Into<String>) -> Self {
        ExtractError::NotFound {
            marker: marker.into(),
        }
    }

    /// A short hint on how to get a dump that does contain the marker.
    fn recollect_hint(marker: &str) -> &'static str {
        match marker {
            "ue-CapabilityRequest" | "ueCapabilityInformation" => {
                "recollect the log with a fresh attach so the network asks for UE capabilities"
            }
            "rf-ParametersMRDC" | "supportedBandCombinationList" => {
                "recollect the log with the UE attaching to a 5G (EN-DC) cell"
            }
            _ => "check that the dump was exported with signaling messages included",
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::NotFound { marker } => write!(
                f,
                "log does not contain {}; {}",
                marker,
                ExtractError::recollect_hint(marker)
            ),
            ExtractError::MalformedSubtree { start, len } => write!(
                f,
                "list at line {} has {} line(s), too few to find its entries; the dump looks truncated",
                start + 1,
                len
            ),
            ExtractError::UnrecognizedField { line, key } => {
                write!(f, "unrecognized field '{}' at line {}", key, line + 1)
            }
            ExtractError::InputEncoding { line, reason } => {
                write!(f, "line {} cannot be measured: {}", line + 1, reason)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Type alias for extraction results
pub type ExtractResult<T> = Result<T, ExtractError>;
