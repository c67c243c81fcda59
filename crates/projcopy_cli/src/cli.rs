use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use projcopy_io_fs::{
    C_MANIFEST_FILE_NAME, EnumExcludePatternMode, EnumTransferMode, N_COMPRESSION_LEVEL_DEFAULT,
    SpecTransferOptions,
};

/// Copy a project tree to a directory or a zip archive, skipping build
/// artifacts, then rename the project in its manifest.
///
/// Every value left out on the command line is asked for interactively.
#[derive(Parser, Debug)]
#[command(name = "projcopy", author, version, about, long_about = None)]
pub struct Args {
    /// Project root to copy. Defaults to the current directory.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output mode.
    #[arg(long, value_enum)]
    pub mode: Option<ArgOutputMode>,

    /// Destination directory, or archive path (`.zip` is appended when missing).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Answer yes to every confirmation: create parents, overwrite, proceed.
    #[arg(short, long)]
    pub yes: bool,

    /// Manifest file that must exist in the source and gets renamed in the copy.
    #[arg(long, default_value = C_MANIFEST_FILE_NAME)]
    pub manifest: String,

    /// Extra exclusion rule, on top of the built-in list. Repeatable.
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub patterns_exclude: Vec<String>,

    /// How `--exclude` rules are matched (always case-insensitive).
    #[arg(long, value_enum, default_value_t = ArgPatternMode::Literal)]
    pub pattern_mode: ArgPatternMode,

    /// Deflate level for zip entries (0-9).
    #[arg(
        long,
        default_value_t = N_COMPRESSION_LEVEL_DEFAULT,
        value_parser = clap::value_parser!(i32).range(0..=9)
    )]
    pub compression_level: i32,

    /// Number of errors listed in the summary.
    #[arg(long, default_value_t = 10)]
    pub max_errors: usize,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgOutputMode {
    /// Copy into a directory.
    #[value(alias = "dir")]
    Directory,
    /// Create a zip archive.
    Zip,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgPatternMode {
    /// Substring match.
    Literal,
    /// Shell-like wildcards.
    Glob,
    /// Regular expression.
    Regex,
}

impl From<ArgOutputMode> for EnumTransferMode {
    fn from(value: ArgOutputMode) -> Self {
        match value {
            ArgOutputMode::Directory => EnumTransferMode::Directory,
            ArgOutputMode::Zip => EnumTransferMode::Archive,
        }
    }
}

impl From<ArgPatternMode> for EnumExcludePatternMode {
    fn from(value: ArgPatternMode) -> Self {
        match value {
            ArgPatternMode::Literal => EnumExcludePatternMode::Literal,
            ArgPatternMode::Glob => EnumExcludePatternMode::Glob,
            ArgPatternMode::Regex => EnumExcludePatternMode::Regex,
        }
    }
}

impl Args {
    pub fn to_transfer_options(&self) -> SpecTransferOptions {
        SpecTransferOptions {
            patterns_exclude_extra: (!self.patterns_exclude.is_empty())
                .then(|| self.patterns_exclude.clone()),
            rule_pattern: self.pattern_mode.into(),
            n_compression_level: self.compression_level,
            ..SpecTransferOptions::default()
        }
    }
}
