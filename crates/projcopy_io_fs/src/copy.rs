//! Directory copy writer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::SpecExcludeRules;
use crate::report::ReportTransfer;
use crate::spec::{SpecTransferError, SpecTransferOptions, TransferError};
use crate::util::{copy_file_with_metadata, derive_destination_path, is_overlap};
use crate::walk::{TransferSink, TreeWalker};

struct SinkCopy {
    path_dir_dst: PathBuf,
}

impl TransferSink for SinkCopy {
    fn enter_dir(&mut self, path_rel: &Path) -> Result<(), SpecTransferError> {
        let path_dir_dst_sub = derive_destination_path(&self.path_dir_dst, path_rel);
        fs::create_dir_all(&path_dir_dst_sub).map_err(|e| SpecTransferError {
            path: path_dir_dst_sub.clone(),
            exception: format!("Error creating directory: {e}"),
        })
    }

    fn transfer_file(
        &mut self,
        path_file_src: &Path,
        path_rel: &Path,
    ) -> Result<(), SpecTransferError> {
        let path_file_dst = derive_destination_path(&self.path_dir_dst, path_rel);
        copy_file_with_metadata(path_file_src, &path_file_dst).map_err(|e| SpecTransferError {
            path: path_file_src.to_path_buf(),
            exception: format!("Error copying file: {e}"),
        })
    }
}

/// Copy a directory tree from `dir_source` to `dir_destination`, dropping
/// excluded entries.
///
/// Directories are created idempotently. Per-entry failures (directory
/// creation, file copy) are recorded in the returned [`ReportTransfer`] and
/// never abort the walk. `on_progress` receives the running copied count every
/// [`SpecTransferOptions::n_progress_interval`] successful copies.
///
/// Returns [`TransferError`] only for validation failures detected before any
/// I/O: missing source directory, overlapping source/destination, or an
/// invalid extra pattern.
pub fn copy_tree<P, Q, F>(
    dir_source: P,
    dir_destination: Q,
    spec_tx_options: &SpecTransferOptions,
    mut on_progress: F,
) -> Result<ReportTransfer, TransferError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(u64),
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if !path_dir_src.is_dir() {
        return Err(TransferError::SourceNotDirectory(path_dir_src));
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(TransferError::SourceDestinationOverlap {
            path_source: path_dir_src,
            path_destination: path_dir_dst,
        });
    }
    let spec_ex_rules = SpecExcludeRules::from_options(spec_tx_options)?;

    tracing::info!(
        src = %path_dir_src.display(),
        dst = %path_dir_dst.display(),
        "copy started"
    );
    let mut sink = SinkCopy { path_dir_dst };
    let report = TreeWalker::new(
        &path_dir_src,
        &spec_ex_rules,
        spec_tx_options.n_progress_interval,
        &mut on_progress,
    )
    .run(&mut sink)
    .build();
    tracing::info!("{}", report.format("[COPY]"));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::copy_tree;
    use crate::spec::{EnumExcludePatternMode, SpecTransferOptions, TransferError};

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    #[test]
    fn copy_tree_smoke_basic() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("root.txt"), "root");
        write_text(&src.join("a/file1.txt"), "a");
        write_text(&src.join("b/sub/file2.txt"), "b");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_copied, 3);
        assert_eq!(
            std::fs::read_to_string(dst.join("b/sub/file2.txt")).expect("read"),
            "b"
        );
        assert!(dst.join("root.txt").exists());
        assert!(dst.join("a/file1.txt").exists());
    }

    #[test]
    fn copy_tree_counts_are_complete() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("package.json"), "{}");
        write_text(&src.join("src/App.js"), "app");
        write_text(&src.join("src/util.pyc"), "bytecode");
        write_text(&src.join("npm-debug.log"), "log");
        write_text(&src.join(".vscode/settings.json"), "{}");
        write_text(&src.join(".vscode/launch.json"), "{}");
        write_text(&src.join("node_modules/lib/x.js"), "x");
        write_text(&src.join("build/out.js"), "out");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_copied, 3);
        assert_eq!(report.cnt_skipped, 3);
        assert_eq!(report.cnt_copied + report.cnt_skipped, report.cnt_scanned);

        assert!(dst.join(".vscode/launch.json").exists());
        assert!(!dst.join(".vscode/settings.json").exists());
        assert!(!dst.join("src/util.pyc").exists());
        assert!(!dst.join("node_modules").exists());
        assert!(!dst.join("build").exists());
    }

    #[test]
    fn copy_tree_mixed_case_directories_are_pruned() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("Node_Modules/pkg/index.js"), "x");
        write_text(&src.join("keep/index.js"), "k");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.cnt_copied, 1);
        assert_eq!(report.cnt_skipped, 0);
        assert!(!dst.join("Node_Modules").exists());
    }

    #[test]
    fn copy_tree_existing_destination_is_merged() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("a/file.txt"), "new");
        write_text(&dst.join("a/other.txt"), "kept");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 0);
        assert!(dst.join("a/other.txt").exists());
        assert_eq!(
            std::fs::read_to_string(dst.join("a/file.txt")).expect("read"),
            "new"
        );
    }

    #[test]
    fn copy_tree_extra_glob_patterns() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        write_text(&src.join("coverage/lcov.info"), "c");
        write_text(&src.join("server.LOG"), "l");
        write_text(&src.join("index.js"), "i");

        let spec_tx_options = SpecTransferOptions {
            patterns_exclude_extra: Some(vec!["coverage".to_string(), "*.log".to_string()]),
            rule_pattern: EnumExcludePatternMode::Glob,
            ..SpecTransferOptions::default()
        };
        let report = copy_tree(&src, &dst, &spec_tx_options, |_| {}).expect("copy tree");
        assert_eq!(report.cnt_copied, 1);
        assert_eq!(report.cnt_skipped, 1);
        assert!(dst.join("index.js").exists());
        assert!(!dst.join("coverage").exists());
    }

    #[test]
    fn copy_tree_overlap_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");

        let nested = src.join("nested");
        let err = copy_tree(&src, &nested, &SpecTransferOptions::default(), |_| {})
            .expect_err("must fail");
        assert!(matches!(err, TransferError::SourceDestinationOverlap { .. }));
    }

    #[test]
    fn copy_tree_missing_source_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = copy_tree(
            tmp.path().join("absent"),
            tmp.path().join("dst"),
            &SpecTransferOptions::default(),
            |_| {},
        )
        .expect_err("must fail");
        assert!(matches!(err, TransferError::SourceNotDirectory(_)));
    }

    #[test]
    fn copy_tree_reports_progress() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        for n_idx in 0..120 {
            write_text(&src.join(format!("d{}/f{n_idx}.txt", n_idx % 4)), "x");
        }

        let mut l_ticks = Vec::new();
        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |cnt| {
            l_ticks.push(cnt)
        })
        .expect("copy tree");
        assert_eq!(report.cnt_copied, 120);
        assert_eq!(l_ticks, vec![50, 100]);
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_records_per_file_errors_and_continues() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write_text(&src.join("a.txt"), "a");
        write_text(&src.join("z.txt"), "z");
        symlink(src.join("missing.txt"), src.join("m_broken.txt")).expect("symlink");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].path, src.join("m_broken.txt"));
        assert_eq!(report.cnt_copied, 2);
        assert!(dst.join("z.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_directory_creation_failure_is_recorded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write_text(&src.join("blocked/inner.txt"), "x");
        write_text(&src.join("ok.txt"), "ok");
        // A plain file where the mirrored directory should go.
        write_text(&dst.join("blocked"), "not a dir");

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 1);
        assert!(report.errors[0].exception.starts_with("Error creating directory"));
        assert_eq!(report.cnt_copied, 1);
        assert!(dst.join("ok.txt").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn copy_tree_preserves_linux_metadata() {
        use filetime::{FileTime, set_file_times};
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        let path_file_src = src.join("meta.txt");
        write_text(&path_file_src, "meta");

        std::fs::set_permissions(&path_file_src, std::fs::Permissions::from_mode(0o640))
            .expect("set permissions");
        set_file_times(
            &path_file_src,
            FileTime::from_unix_time(1_700_000_010, 0),
            FileTime::from_unix_time(1_700_000_020, 0),
        )
        .expect("set times");

        let c_xattr_name = "user.projcopy_test";
        let b_if_has_xattr = xattr::set(&path_file_src, c_xattr_name, b"meta_value").is_ok();

        let report = copy_tree(&src, &dst, &SpecTransferOptions::default(), |_| {})
            .expect("copy tree");
        assert_eq!(report.error_count(), 0);

        let path_file_dst = dst.join("meta.txt");
        let stat_src = std::fs::metadata(&path_file_src).expect("src metadata");
        let stat_dst = std::fs::metadata(&path_file_dst).expect("dst metadata");
        assert_eq!(
            stat_src.permissions().mode() & 0o777,
            stat_dst.permissions().mode() & 0o777
        );
        assert_eq!(
            FileTime::from_last_modification_time(&stat_src),
            FileTime::from_last_modification_time(&stat_dst)
        );

        if b_if_has_xattr {
            let raw_value_dst = xattr::get(&path_file_dst, c_xattr_name)
                .expect("get dst xattr")
                .expect("xattr exists");
            assert_eq!(raw_value_dst, b"meta_value");
        }
    }
}
