//! `projcopy_io_fs` v1:
//! Project tree transfer engine.
//!
//! Modules:
//! - `filter`   : exclusion rules
//! - `copy`     : directory copy writer
//! - `archive`  : zip archive writer
//! - `manifest` : post-transfer manifest `name` rewrite
//! - `verify`   : presence check of well-known entries
//! - `stats`    : unfiltered source statistics
//! - `spec`     : enums/options/errors
//! - `report`   : run-time report model
//! - `util`     : shared helper functions

pub mod archive;
pub mod copy;
pub mod filter;
pub mod manifest;
pub mod report;
pub mod spec;
pub mod stats;
pub mod verify;
mod util;
mod walk;

pub use archive::create_archive;
pub use copy::copy_tree;
pub use filter::{SpecExcludeRules, TUP_EXCLUDE_RULES_DEFAULT, is_excluded};
pub use manifest::{derive_project_name, rewrite_manifest_name, rewrite_manifest_name_in_archive};
pub use report::{ReportTransfer, ReportTransferBuilder};
pub use spec::{
    C_MANIFEST_FILE_NAME, EnumExcludePatternMode, EnumTransferMode, ManifestError,
    N_COMPRESSION_LEVEL_DEFAULT, N_PROGRESS_INTERVAL_DEFAULT, SpecManifestRename,
    SpecTransferError, SpecTransferOptions, TUP_EXPECTED_ENTRIES_DEFAULT, TransferError,
};
pub use stats::{SpecTreeStats, scan_tree_stats};
pub use verify::find_missing_entries;
