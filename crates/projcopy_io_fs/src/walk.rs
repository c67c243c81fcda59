//! Top-down source traversal shared by the copy and archive writers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::SpecExcludeRules;
use crate::report::ReportTransferBuilder;
use crate::spec::SpecTransferError;
use crate::util::derive_entry_name;

/// Destination side of a traversal.
pub(crate) trait TransferSink {
    /// Prepare the mirror of one source directory (`""` is the root).
    ///
    /// On `Err` the directory's files are not transferred; its
    /// subdirectories are still walked.
    fn enter_dir(&mut self, path_rel: &Path) -> Result<(), SpecTransferError>;

    /// Transfer one file that passed the exclusion rules.
    fn transfer_file(
        &mut self,
        path_file_src: &Path,
        path_rel: &Path,
    ) -> Result<(), SpecTransferError>;
}

#[derive(Debug)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
}

#[derive(Debug)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
    if_is_special: bool,
}

pub(crate) struct TreeWalker<'a> {
    path_dir_src: &'a Path,
    spec_ex_rules: &'a SpecExcludeRules,
    n_progress_interval: u64,
    path_rel_ignored: Option<PathBuf>,
    on_progress: &'a mut dyn FnMut(u64),
    builder_tx_report: ReportTransferBuilder,
}

impl<'a> TreeWalker<'a> {
    pub(crate) fn new(
        path_dir_src: &'a Path,
        spec_ex_rules: &'a SpecExcludeRules,
        n_progress_interval: u64,
        on_progress: &'a mut dyn FnMut(u64),
    ) -> Self {
        Self {
            path_dir_src,
            spec_ex_rules,
            n_progress_interval,
            path_rel_ignored: None,
            on_progress,
            builder_tx_report: ReportTransferBuilder::default(),
        }
    }

    /// Never transfer the file at `path_rel` (e.g. the archive being written).
    pub(crate) fn with_ignored(mut self, path_rel: Option<PathBuf>) -> Self {
        self.path_rel_ignored = path_rel;
        self
    }

    /// Walk the whole source tree into `sink`.
    pub(crate) fn run(mut self, sink: &mut dyn TransferSink) -> ReportTransferBuilder {
        let path_root = self.path_dir_src.to_path_buf();
        self.walk_directory(&path_root, sink);
        self.builder_tx_report
    }

    fn walk_directory(&mut self, path_root: &Path, sink: &mut dyn TransferSink) {
        let path_rel = path_root
            .strip_prefix(self.path_dir_src)
            .unwrap_or(Path::new(""))
            .to_path_buf();

        let b_dir_ready = match sink.enter_dir(&path_rel) {
            Ok(()) => true,
            Err(spec_error) => {
                self.builder_tx_report.push_error(spec_error);
                false
            }
        };

        let iter_entries = match fs::read_dir(path_root) {
            Ok(iter) => iter,
            Err(e) => {
                self.builder_tx_report.add_warning(format!(
                    "Failed to read directory {} ({e})",
                    path_root.display()
                ));
                return;
            }
        };

        let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
        let mut l_files: Vec<SpecFileEntry> = Vec::new();

        for _entry_res in iter_entries {
            let entry = match _entry_res {
                Ok(v) => v,
                Err(e) => {
                    self.builder_tx_report.add_warning(format!(
                        "Failed to read directory entry under {} ({e})",
                        path_root.display()
                    ));
                    continue;
                }
            };

            let path_entry = entry.path();
            let c_name = entry.file_name().to_string_lossy().to_string();
            let cfg_file_type = match entry.file_type() {
                Ok(v) => v,
                Err(e) => {
                    self.builder_tx_report
                        .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                    continue;
                }
            };

            if cfg_file_type.is_dir() {
                l_dirs.push(SpecDirEntry {
                    path_dir_src_sub: path_entry,
                    name_dir: c_name,
                });
            } else if cfg_file_type.is_symlink() && path_entry.is_dir() {
                if !self.spec_ex_rules.is_excluded(&c_name) {
                    self.builder_tx_report.add_warning(format!(
                        "Directory symlink not followed: {}",
                        path_entry.display()
                    ));
                }
            } else {
                // Broken symlinks land here too; the sink reports them.
                l_files.push(SpecFileEntry {
                    path_file_src: path_entry,
                    name_file: c_name,
                    if_is_special: !cfg_file_type.is_file() && !cfg_file_type.is_symlink(),
                });
            }
        }

        l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
        l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

        l_dirs.retain(|d| {
            let b_excluded = self.spec_ex_rules.is_excluded(&d.name_dir);
            if b_excluded {
                tracing::debug!(path = %d.path_dir_src_sub.display(), "pruned directory");
            }
            !b_excluded
        });

        if b_dir_ready {
            for _file_entry in l_files {
                self.handle_file_entry(_file_entry, &path_rel, sink);
            }
        }

        for _dir_entry in l_dirs {
            self.walk_directory(&_dir_entry.path_dir_src_sub, sink);
        }
    }

    fn handle_file_entry(
        &mut self,
        spec_file_entry: SpecFileEntry,
        path_rel_parent: &Path,
        sink: &mut dyn TransferSink,
    ) {
        self.builder_tx_report.add_scanned();

        let path_rel = path_rel_parent.join(&spec_file_entry.name_file);
        let c_entry_name = derive_entry_name(&path_rel);
        if self.spec_ex_rules.is_excluded(&c_entry_name) {
            tracing::debug!(path = %c_entry_name, "excluded file");
            self.builder_tx_report.add_skipped();
            return;
        }
        if self.path_rel_ignored.as_deref() == Some(path_rel.as_path()) {
            self.builder_tx_report.add_skipped();
            return;
        }
        if spec_file_entry.if_is_special {
            self.builder_tx_report.add_warning(format!(
                "Special file skipped: {}",
                spec_file_entry.path_file_src.display()
            ));
            self.builder_tx_report.add_skipped();
            return;
        }

        match sink.transfer_file(&spec_file_entry.path_file_src, &path_rel) {
            Ok(()) => {
                tracing::debug!(path = %c_entry_name, "transferred");
                self.builder_tx_report.add_copied();
                let cnt_copied = self.builder_tx_report.cnt_copied;
                if self.n_progress_interval > 0 && cnt_copied % self.n_progress_interval == 0 {
                    (self.on_progress)(cnt_copied);
                }
            }
            Err(spec_error) => self.builder_tx_report.push_error(spec_error),
        }
    }
}
