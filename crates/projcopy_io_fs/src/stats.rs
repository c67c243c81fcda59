//! Unfiltered size statistics of a source tree.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Totals shown before a transfer starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpecTreeStats {
    pub cnt_files: u64,
    pub cnt_dirs: u64,
    pub n_bytes_total: u64,
}

impl SpecTreeStats {
    /// Total size in MiB.
    pub fn size_mib(&self) -> f64 {
        self.n_bytes_total as f64 / (1024.0 * 1024.0)
    }
}

/// Count every file and directory below `dir_source`, exclusion rules ignored.
///
/// Directory symlinks count as directories but are not descended into.
/// Unreadable entries are counted without contributing bytes.
pub fn scan_tree_stats<P: AsRef<Path>>(dir_source: P) -> SpecTreeStats {
    let mut spec_stats = SpecTreeStats::default();
    for _entry_res in WalkDir::new(dir_source).min_depth(1) {
        let Ok(entry) = _entry_res else {
            continue;
        };
        let path_entry = entry.path();
        let cfg_file_type = entry.file_type();
        if cfg_file_type.is_dir() || (cfg_file_type.is_symlink() && path_entry.is_dir()) {
            spec_stats.cnt_dirs += 1;
            continue;
        }
        spec_stats.cnt_files += 1;
        if let Ok(meta_file) = fs::metadata(path_entry) {
            spec_stats.n_bytes_total += meta_file.len();
        }
    }
    spec_stats
}

#[cfg(test)]
mod tests {
    use super::scan_tree_stats;

    #[test]
    fn stats_count_everything_including_excluded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path();
        std::fs::create_dir_all(src.join("node_modules/lib")).expect("mkdir");
        std::fs::create_dir_all(src.join("src")).expect("mkdir");
        std::fs::write(src.join("node_modules/lib/x.js"), vec![0_u8; 1000]).expect("write");
        std::fs::write(src.join("src/App.js"), vec![0_u8; 24]).expect("write");
        std::fs::write(src.join("package.json"), b"{}").expect("write");

        let spec_stats = scan_tree_stats(src);
        assert_eq!(spec_stats.cnt_files, 3);
        assert_eq!(spec_stats.cnt_dirs, 3);
        assert_eq!(spec_stats.n_bytes_total, 1026);
        assert!(spec_stats.size_mib() < 0.01);
    }
}
