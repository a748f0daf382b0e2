//! Testing utilities
//!
//!     Helpers shared by the unit tests and the integration tests under `tests/`.
//!
//! Verified Samples
//!
//!     Capability dumps are rendered by vendor tools, and the details matter: two spaces per
//!     level, values after `: `, encoded forms in trailing parentheses, list entries repeated at
//!     one depth. A dump typed from memory is almost right, and tests tuned against an almost
//!     right dump prove nothing about real logs.
//!
//!     So whole-dump tests must load the curated files under `samples/` through [Sample]. Those
//!     files follow real exports line for line; when a renderer changes, they are the one place
//!     to update. Short inline fragments built with [lines] are fine for exercising one rule at a
//!     time (a depth boundary, a single field), never for end-to-end behavior.
//!
//!     Available samples:
//!
//!         - [Sample::Attach]: NAS attach, capability enquiry and a capability information
//!           message carrying E-UTRA, UTRA and EN-DC containers.
//!         - [Sample::LteOnly]: an LTE-only device, no MR-DC section anywhere.
//!         - [Sample::RadioLinkFailure]: a re-establishment after a link failure, the follow-up
//!           RLF report and an NR secondary cell group failure.

use crate::capscan::error::ExtractResult;
use crate::capscan::line::{lines_from_bytes, Line};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Build a line sequence from literal fragments.
pub fn lines(source: &[&str]) -> Vec<Line> {
    source.iter().map(|text| Line::new(*text)).collect()
}

/// Errors that can occur when loading a sample
#[derive(Debug)]
pub enum SampleError {
    Io(PathBuf, std::io::Error),
    Encoding(String),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::Io(path, err) => write!(f, "cannot read {}: {}", path.display(), err),
            SampleError::Encoding(msg) => write!(f, "sample is not a text dump: {}", msg),
        }
    }
}

impl std::error::Error for SampleError {}

/// The curated dumps under `samples/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Attach,
    LteOnly,
    RadioLinkFailure,
}

impl Sample {
    pub fn file_name(self) -> &'static str {
        match self {
            Sample::Attach => "ue-capability-attach.txt",
            Sample::LteOnly => "ue-capability-lte-only.txt",
            Sample::RadioLinkFailure => "ue-radio-link-failure.txt",
        }
    }

    pub fn path(self) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("samples")
            .join(self.file_name())
    }

    pub fn try_lines(self) -> Result<Vec<Line>, SampleError> {
        let path = self.path();
        let bytes = fs::read(&path).map_err(|err| SampleError::Io(path, err))?;
        let lines: ExtractResult<Vec<Line>> = lines_from_bytes(&bytes);
        lines.map_err(|err| SampleError::Encoding(err.to_string()))
    }

    /// The sample's lines. Panics when the file is missing, which only a broken checkout causes.
    pub fn lines(self) -> Vec<Line> {
        self.try_lines()
            .unwrap_or_else(|err| panic!("sample {}: {}", self.file_name(), err))
    }
}
