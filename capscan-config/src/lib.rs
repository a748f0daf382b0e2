//! Shared configuration loader for the capscan toolchain.
//!
//! `defaults/capscan.default.toml` is embedded into every binary so that the documented defaults
//! and runtime behavior stay in sync. Applications layer user-specific files on top of those
//! defaults via [`Loader`] before deserializing into [`CapscanConfig`].
//!
//! Layering order: embedded defaults, then the per-user file at [`user_config_path`] when it
//! exists, then an explicit `--config` file, then single-key overrides.

use capscan_parser::capscan::capability::{ExtractionSettings, FeatureSet};
use capscan_parser::capscan::combos::ComboEncoder;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/capscan.default.toml");
const USER_CONFIG_FILE: &str = "capscan/config.toml";

/// Top-level configuration consumed by capscan applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CapscanConfig {
    pub extraction: ExtractionConfig,
    pub combos: ComboEncoder,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl CapscanConfig {
    /// The parser-side settings described by this configuration.
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            eutra: self.extraction.eutra.clone(),
            utra: self.extraction.utra.clone(),
            combos: self.combos.clone(),
        }
    }
}

/// Per-RAT feature tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub eutra: FeatureSet,
    pub utra: FeatureSet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (the CLI's `--format`, for instance).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<CapscanConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// `$XDG_CONFIG_HOME/capscan/config.toml`, or `$HOME/.config/capscan/config.toml` when
/// `XDG_CONFIG_HOME` is unset or empty.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_path_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

fn user_config_path_from(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    let base = match xdg_config_home.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.filter(|dir| !dir.is_empty())?).join(".config"),
    };
    Some(base.join(USER_CONFIG_FILE))
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CapscanConfig, ConfigError> {
    Loader::new().build()
}
