//! Transfer specification models and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Constants

/// Manifest file rewritten after a transfer.
pub const C_MANIFEST_FILE_NAME: &str = "package.json";
/// Successful copies between two progress callbacks.
pub const N_PROGRESS_INTERVAL_DEFAULT: u64 = 50;
/// Deflate level used for archive entries (0-9 scale).
pub const N_COMPRESSION_LEVEL_DEFAULT: i32 = 6;
/// Entries whose absence is reported after a transfer.
pub const TUP_EXPECTED_ENTRIES_DEFAULT: [&str; 4] =
    [".claude/", "CLAUDE.md", "package.json", "src/App.js"];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Destination kind of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTransferMode {
    /// Mirror the source tree into a destination directory.
    Directory,
    /// Stream the source tree into one zip archive.
    Archive,
}

/// Interpretation of user-supplied exclusion patterns.
///
/// Built-in rules are always [`EnumExcludePatternMode::Literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumExcludePatternMode {
    /// Case-insensitive substring containment.
    Literal,
    /// Case-insensitive shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Case-insensitive regular expression.
    Regex,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for [`crate::copy_tree`] and [`crate::create_archive`].
#[derive(Debug, Clone)]
pub struct SpecTransferOptions {
    /// Extra exclusion patterns appended to the built-in rules.
    pub patterns_exclude_extra: Option<Vec<String>>,
    /// Pattern interpretation mode for `patterns_exclude_extra`.
    pub rule_pattern: EnumExcludePatternMode,
    /// Successful copies between progress callbacks. `0` disables progress.
    pub n_progress_interval: u64,
    /// Deflate level for archive entries, clamped to `0..=9`.
    pub n_compression_level: i32,
}

impl Default for SpecTransferOptions {
    fn default() -> Self {
        Self {
            patterns_exclude_extra: None,
            rule_pattern: EnumExcludePatternMode::Literal,
            n_progress_interval: N_PROGRESS_INTERVAL_DEFAULT,
            n_compression_level: N_COMPRESSION_LEVEL_DEFAULT,
        }
    }
}

/// One transfer failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTransferError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

impl fmt::Display for SpecTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.exception)
    }
}

/// Outcome of a successful manifest rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecManifestRename {
    /// Previous `name` value (`"unknown"` when absent).
    pub name_old: String,
    /// Value written into `name`.
    pub name_new: String,
}

/// "Top-level call failed" errors (input validation stage).
#[derive(Debug, Error)]
pub enum TransferError {
    /// Invalid extra exclusion pattern.
    #[error("Invalid pattern in exclude list: {0}")]
    InvalidPattern(String),
    /// Source path is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        path_source.display(),
        path_destination.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        path_source: PathBuf,
        /// Normalized destination directory.
        path_destination: PathBuf,
    },
}

/// Manifest rewrite failures. Callers downgrade these to warnings.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid JSON in {location}: {source}")]
    Parse {
        location: String,
        source: serde_json::Error,
    },
    #[error("Manifest {0} is not a JSON object")]
    NotAnObject(String),
    #[error("Archive error on {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
