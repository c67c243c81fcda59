//! Shallow presence check of well-known project entries after a transfer.

use std::fs::File;
use std::io;
use std::path::Path;

use zip::ZipArchive;

use crate::spec::EnumTransferMode;

/// Return the entries of `l_entries_expected` missing from the destination.
///
/// Directory mode checks `path_destination/<entry>` on disk. Archive mode
/// treats an entry as present when any archive entry name starts with it, so
/// `".claude/"` matches any file below that directory.
pub fn find_missing_entries(
    path_destination: &Path,
    enum_mode: EnumTransferMode,
    l_entries_expected: &[&str],
) -> io::Result<Vec<String>> {
    match enum_mode {
        EnumTransferMode::Directory => Ok(l_entries_expected
            .iter()
            .filter(|c_entry| !path_destination.join(c_entry.trim_end_matches('/')).exists())
            .map(|c_entry| c_entry.to_string())
            .collect()),
        EnumTransferMode::Archive => {
            let archive = ZipArchive::new(File::open(path_destination)?).map_err(io::Error::other)?;
            let l_names: Vec<&str> = archive.file_names().collect();
            Ok(l_entries_expected
                .iter()
                .filter(|c_entry| !l_names.iter().any(|c_name| c_name.starts_with(**c_entry)))
                .map(|c_entry| c_entry.to_string())
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::FileOptions;

    use super::find_missing_entries;
    use crate::spec::{EnumTransferMode, TUP_EXPECTED_ENTRIES_DEFAULT};

    #[test]
    fn directory_presence_check() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join(".claude")).expect("mkdir");
        std::fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
        std::fs::write(tmp.path().join("src/App.js"), "app").expect("write");

        let l_missing = find_missing_entries(
            tmp.path(),
            EnumTransferMode::Directory,
            &TUP_EXPECTED_ENTRIES_DEFAULT,
        )
        .expect("check");
        assert_eq!(l_missing, vec!["CLAUDE.md".to_string(), "package.json".to_string()]);
    }

    #[test]
    fn archive_presence_check_uses_prefixes() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_archive = tmp.path().join("out.zip");
        let mut writer = ZipWriter::new(File::create(&path_archive).expect("create"));
        for c_name in [".claude/commands/x.md", "CLAUDE.md", "package.json"] {
            writer
                .start_file(c_name, FileOptions::default())
                .expect("start file");
            writer.write_all(b"x").expect("write");
        }
        writer.finish().expect("finish");

        let l_missing = find_missing_entries(
            &path_archive,
            EnumTransferMode::Archive,
            &TUP_EXPECTED_ENTRIES_DEFAULT,
        )
        .expect("check");
        assert_eq!(l_missing, vec!["src/App.js".to_string()]);
    }
}
