//! Run configuration.
//!
//! Command-line flags and the optional JSON config file are merged once at
//! startup into a [`PrepConfig`]; stages only ever see the resolved
//! [`StageFlags`].

use crate::cleaning::Stage;
use crate::error::{PrepError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Separator used by the original tool for every file it touched.
pub const DEFAULT_SEPARATOR: Separator = Separator(b'|');

/// A single-byte ASCII field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Separator(u8);

impl Separator {
    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl Default for Separator {
    fn default() -> Self {
        DEFAULT_SEPARATOR
    }
}

impl FromStr for Separator {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        let s = match s {
            "\\t" | "tab" => "\t",
            other => other,
        };
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' && c != '"' => {
                Ok(Self(c as u8))
            }
            _ => Err(PrepError::Config(format!(
                "separator must be a single ASCII character other than a quote or newline, got {s:?}"
            ))),
        }
    }
}

impl TryFrom<String> for Separator {
    type Error = PrepError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Separator> for String {
    fn from(sep: Separator) -> Self {
        char::from(sep.0).to_string()
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => write!(f, "\\t"),
            b => write!(f, "{}", char::from(b)),
        }
    }
}

/// Which stages remove rows instead of only reporting them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageFlags {
    pub remove_duplicates: bool,
    pub remove_missing: bool,
    pub remove_blank: bool,
}

impl StageFlags {
    /// Resolve the `--all` shortcut against the individually requested stages.
    pub fn resolve(all: bool, requested: Self) -> Self {
        Self {
            remove_duplicates: all || requested.remove_duplicates,
            remove_missing: all || requested.remove_missing,
            remove_blank: all || requested.remove_blank,
        }
    }

    pub fn all() -> Self {
        Self::resolve(true, Self::default())
    }

    /// Remove rows for `stage` only; the other stages just report.
    pub fn only(stage: Stage) -> Self {
        Self {
            remove_duplicates: stage == Stage::Duplicates,
            remove_missing: stage == Stage::Missing,
            remove_blank: stage == Stage::Blank,
        }
    }

    /// Whether `stage` removes rows in this run.
    pub fn removes(&self, stage: Stage) -> bool {
        match stage {
            Stage::Duplicates => self.remove_duplicates,
            Stage::Missing => self.remove_missing,
            Stage::Blank => self.remove_blank,
        }
    }
}

/// How a delimited file is parsed into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub separator: Separator,
    /// Tokens read as missing values in addition to empty fields.
    pub null_values: Vec<String>,
    /// Rows scanned to infer column types. `None` (the default) scans the
    /// whole file; `Some(0)` reads every column as text.
    pub infer_schema_length: Option<usize>,
}

impl ReadOptions {
    pub fn with_separator(separator: Separator) -> Self {
        Self {
            separator,
            ..Self::default()
        }
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            null_values: Vec::new(),
            infer_schema_length: None,
        }
    }
}

/// Fully resolved settings for one cleaning run.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    pub data_path: PathBuf,
    pub rules_path: PathBuf,
    /// Overrides the `<stem>_prepared.csv` naming when set.
    pub output_path: Option<PathBuf>,
    pub data: ReadOptions,
    pub rules: ReadOptions,
    pub output_separator: Separator,
    pub flags: StageFlags,
}

impl PrepConfig {
    /// Defaults for a pair of input files: report-only, pipe separated.
    pub fn new(data_path: impl Into<PathBuf>, rules_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            rules_path: rules_path.into(),
            output_path: None,
            data: ReadOptions::default(),
            rules: ReadOptions::default(),
            output_separator: DEFAULT_SEPARATOR,
            flags: StageFlags::default(),
        }
    }

    /// Where the prepared table is written.
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| crate::io::prepared_output_path(&self.data_path))
    }
}

/// Settings read from a `--config` JSON file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub all: bool,
    pub duplicates: bool,
    pub empty: bool,
    pub nan: bool,
    pub sep: Option<Separator>,
    pub rules_sep: Option<Separator>,
    pub output_sep: Option<Separator>,
    pub null_values: Vec<String>,
    pub infer_schema_length: Option<usize>,
}

impl ConfigFile {
    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FileNotFound`] if the file is absent and
    /// [`PrepError::Config`] if it is not valid JSON for this structure.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content).map_err(|e| {
            PrepError::Config(format!("invalid config file {}: {e}", path.display()))
        })
    }
}
