//! Destination resolution: archive suffix, parent creation, overwrite.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use projcopy_io_fs::EnumTransferMode;

use crate::prompt::Prompter;

#[derive(Debug, PartialEq, Eq)]
pub enum EnumDestinationState {
    /// Destination is free and its parent exists.
    Ready,
    /// The user declined creating parents or overwriting.
    Declined,
    /// Destination is unusable; the message says why.
    Failed(String),
}

/// Append `.zip` in archive mode unless the path already ends with it
/// (case-insensitive).
pub fn derive_destination_path(raw_path: PathBuf, enum_mode: EnumTransferMode) -> PathBuf {
    if enum_mode == EnumTransferMode::Directory {
        return raw_path;
    }
    let mut c_path: OsString = raw_path.into_os_string();
    if !c_path.to_string_lossy().to_lowercase().ends_with(".zip") {
        c_path.push(".zip");
    }
    PathBuf::from(c_path)
}

/// Best-effort absolute form of a path that may not exist yet.
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(v) = fs::canonicalize(path) {
        return v;
    }
    if let (Some(path_parent), Some(c_name)) = (path.parent(), path.file_name()) {
        let path_parent = if path_parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path_parent
        };
        if let Ok(v) = fs::canonicalize(path_parent) {
            return v.join(c_name);
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Reject destinations that would destroy or recurse into the source.
///
/// An archive may live inside the source (it skips itself); a directory may not.
fn check_overlap(
    path_dir_src: &Path,
    path_dst: &Path,
    enum_mode: EnumTransferMode,
) -> Option<String> {
    let path_src_abs = resolve_path(path_dir_src);
    let path_dst_abs = resolve_path(path_dst);
    if path_src_abs.starts_with(&path_dst_abs) {
        return Some(format!(
            "Destination '{}' contains the source directory.",
            path_dst.display()
        ));
    }
    if enum_mode == EnumTransferMode::Directory && path_dst_abs.starts_with(&path_src_abs) {
        return Some(format!(
            "Destination '{}' is inside the source directory.",
            path_dst.display()
        ));
    }
    None
}

/// Remove an existing destination: recursively for a directory, unlink otherwise.
pub fn remove_existing(path: &Path) -> io::Result<()> {
    let meta_dst = fs::symlink_metadata(path)?;
    if meta_dst.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Make `path_dst` usable: confirm and create missing parents, confirm and
/// remove an existing entry.
///
/// `Err` is reserved for prompt failures; filesystem problems come back as
/// [`EnumDestinationState::Failed`] so an interactive caller can ask again.
pub fn prepare_destination(
    path_dir_src: &Path,
    path_dst: &Path,
    enum_mode: EnumTransferMode,
    prompter: &Prompter,
) -> Result<EnumDestinationState> {
    if let Some(msg) = check_overlap(path_dir_src, path_dst, enum_mode) {
        return Ok(EnumDestinationState::Failed(msg));
    }

    if let Some(path_parent) = path_dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        println!("Parent directory '{}' does not exist.", path_parent.display());
        if !prompter.confirm("Create parent directories?")? {
            return Ok(EnumDestinationState::Declined);
        }
        if let Err(e) = fs::create_dir_all(path_parent) {
            return Ok(EnumDestinationState::Failed(format!(
                "Error creating parent directories: {e}"
            )));
        }
        println!("Created parent directories: {}", path_parent.display());
    }

    if fs::symlink_metadata(path_dst).is_ok() {
        println!("Destination '{}' already exists.", path_dst.display());
        if !prompter.confirm("Overwrite?")? {
            return Ok(EnumDestinationState::Declined);
        }
        if let Err(e) = remove_existing(path_dst) {
            return Ok(EnumDestinationState::Failed(format!(
                "Error removing existing destination: {e}"
            )));
        }
        tracing::info!(path = %path_dst.display(), "removed existing destination");
    }

    Ok(EnumDestinationState::Ready)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use projcopy_io_fs::EnumTransferMode;

    use super::{EnumDestinationState, derive_destination_path, prepare_destination};
    use crate::prompt::Prompter;

    fn write_text(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write file");
    }

    #[test]
    fn archive_suffix_appended_once() {
        assert_eq!(
            derive_destination_path(PathBuf::from("/b/proj"), EnumTransferMode::Archive),
            PathBuf::from("/b/proj.zip")
        );
        assert_eq!(
            derive_destination_path(PathBuf::from("/b/PROJ.ZIP"), EnumTransferMode::Archive),
            PathBuf::from("/b/PROJ.ZIP")
        );
        assert_eq!(
            derive_destination_path(PathBuf::from("/b/proj"), EnumTransferMode::Directory),
            PathBuf::from("/b/proj")
        );
    }

    #[test]
    fn missing_parents_created_when_confirmed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).expect("mkdir");
        let dst = tmp.path().join("a/b/out");

        let enum_state =
            prepare_destination(&src, &dst, EnumTransferMode::Directory, &Prompter::new(true))
                .expect("prepare");
        assert_eq!(enum_state, EnumDestinationState::Ready);
        assert!(tmp.path().join("a/b").is_dir());
        assert!(!dst.exists());
    }

    #[test]
    fn existing_destination_removed_when_confirmed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).expect("mkdir");

        let dst_dir = tmp.path().join("old");
        write_text(&dst_dir.join("deep/file.txt"), "x");
        let enum_state =
            prepare_destination(&src, &dst_dir, EnumTransferMode::Directory, &Prompter::new(true))
                .expect("prepare");
        assert_eq!(enum_state, EnumDestinationState::Ready);
        assert!(!dst_dir.exists());

        let dst_zip = tmp.path().join("old.zip");
        write_text(&dst_zip, "not a zip");
        let enum_state =
            prepare_destination(&src, &dst_zip, EnumTransferMode::Archive, &Prompter::new(true))
                .expect("prepare");
        assert_eq!(enum_state, EnumDestinationState::Ready);
        assert!(!dst_zip.exists());
    }

    #[test]
    fn destination_overlapping_source_is_refused() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("proj");
        write_text(&src.join("package.json"), "{}");
        let prompter = Prompter::new(true);

        let enum_state =
            prepare_destination(&src, tmp.path(), EnumTransferMode::Directory, &prompter)
                .expect("prepare");
        assert!(matches!(enum_state, EnumDestinationState::Failed(_)));
        assert!(src.join("package.json").is_file());

        let enum_state =
            prepare_destination(&src, &src.join("copy"), EnumTransferMode::Directory, &prompter)
                .expect("prepare");
        assert!(matches!(enum_state, EnumDestinationState::Failed(_)));

        let enum_state =
            prepare_destination(&src, &src.join("self.zip"), EnumTransferMode::Archive, &prompter)
                .expect("prepare");
        assert_eq!(enum_state, EnumDestinationState::Ready);
    }
}
