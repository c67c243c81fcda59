use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    // Not created yet: resolve the parent and re-attach the leaf.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(resolved_parent) = fs::canonicalize(parent) {
            return resolved_parent.join(name);
        }
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Path of `path_item` relative to `path_dir_root` when it lies inside it.
pub(crate) fn derive_path_inside(path_dir_root: &Path, path_item: &Path) -> Option<PathBuf> {
    let root_resolved = _normalize_path(path_dir_root);
    let item_resolved = _normalize_path(path_item);
    item_resolved
        .strip_prefix(&root_resolved)
        .ok()
        .map(Path::to_path_buf)
}

/// Join relative path components with `/`, independent of the host separator.
pub(crate) fn derive_entry_name(path_rel: &Path) -> String {
    path_rel
        .components()
        .filter_map(|part| match part {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `path_dir_root/path_rel`, without a trailing separator for the root itself.
pub(crate) fn derive_destination_path(path_dir_root: &Path, path_rel: &Path) -> PathBuf {
    if path_rel.as_os_str().is_empty() {
        return path_dir_root.to_path_buf();
    }
    path_dir_root.join(path_rel)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Copy bytes, permissions, timestamps and (on Linux) extended attributes.
///
/// Symlinked sources are dereferenced.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    apply_file_times(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

fn apply_file_times(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{derive_destination_path, derive_entry_name, derive_path_inside, is_overlap};

    #[test]
    fn entry_name_uses_forward_slashes() {
        let path_rel: PathBuf = ["src", "components", "App.js"].iter().collect();
        assert_eq!(derive_entry_name(&path_rel), "src/components/App.js");
        assert_eq!(derive_entry_name(Path::new("package.json")), "package.json");
        assert_eq!(derive_entry_name(Path::new("")), "");
    }

    #[test]
    fn destination_root_has_no_trailing_separator() {
        let path_dst = Path::new("/tmp/out");
        assert_eq!(derive_destination_path(path_dst, Path::new("")), path_dst);
        assert_eq!(
            derive_destination_path(path_dst, Path::new("a/b.txt")),
            Path::new("/tmp/out/a/b.txt")
        );
    }

    #[test]
    fn overlap_and_inside_detection() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");

        assert!(is_overlap(&src, &src.join("nested")));
        assert!(is_overlap(&src.join("nested"), &src));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));

        assert_eq!(
            derive_path_inside(&src, &src.join("out.zip")),
            Some(PathBuf::from("out.zip"))
        );
        assert_eq!(derive_path_inside(&src, &tmp.path().join("out.zip")), None);
    }
}
