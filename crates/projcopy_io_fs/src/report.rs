//! Transfer report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecTransferError;

/// Aggregate counters and diagnostics for one transfer run.
#[derive(Debug, Default, Clone)]
pub struct ReportTransfer {
    /// Files encountered outside pruned directories.
    pub cnt_scanned: u64,
    /// Files written to the destination.
    pub cnt_copied: u64,
    /// Files dropped by exclusion rules (or not transferable).
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-entry failures, in traversal order.
    pub errors: Vec<SpecTransferError>,
}

impl ReportTransfer {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} skipped={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[TRANSFER]"))
    }
}

/// Mutable accumulator, owned by a single traversal.
#[derive(Debug, Default, Clone)]
pub struct ReportTransferBuilder {
    /// Files seen so far.
    pub cnt_scanned: u64,
    /// Files transferred so far.
    pub cnt_copied: u64,
    /// Files dropped so far.
    pub cnt_skipped: u64,
    /// Per-entry failures collected so far.
    pub errors: Vec<SpecTransferError>,
    /// Warnings collected so far.
    pub warnings: Vec<String>,
}

impl ReportTransferBuilder {
    /// Count one file reached by the walk.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Count one successful transfer.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Count one file left out of the destination.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Record a non-fatal notice and log it.
    pub fn add_warning(&mut self, warning: String) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        tracing::warn!(path = %path.display(), "{exception}");
        self.errors.push(SpecTransferError { path, exception });
    }

    /// Add an already-built error item.
    pub fn push_error(&mut self, spec_error: SpecTransferError) {
        self.add_error(spec_error.path, spec_error.exception);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportTransfer {
        ReportTransfer {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_skipped: self.cnt_skipped,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
