//! Post-transfer rewrite of the manifest `name` field.
//!
//! Both forms are best effort: a missing manifest is `Ok(None)`, and any
//! failure leaves the transferred copy or archive as it was.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use crate::archive::derive_entry_options;
use crate::spec::{
    EnumTransferMode, ManifestError, N_COMPRESSION_LEVEL_DEFAULT, SpecManifestRename,
};

/// Project name for a destination: last path segment (archive stem in archive
/// mode), lowercased, spaces replaced with hyphens.
pub fn derive_project_name(path_destination: &Path, enum_mode: EnumTransferMode) -> Option<String> {
    let c_segment = match enum_mode {
        EnumTransferMode::Directory => path_destination.file_name(),
        EnumTransferMode::Archive => path_destination.file_stem(),
    }?;
    Some(c_segment.to_string_lossy().to_lowercase().replace(' ', "-"))
}

/// Replace `name` in a serialized manifest; returns the new text and old name.
fn apply_manifest_name(
    raw_manifest: &[u8],
    name_new: &str,
    c_location: &str,
) -> Result<(String, String), ManifestError> {
    let mut value_manifest: Value =
        serde_json::from_slice(raw_manifest).map_err(|e| ManifestError::Parse {
            location: c_location.to_string(),
            source: e,
        })?;
    let Some(dict_manifest) = value_manifest.as_object_mut() else {
        return Err(ManifestError::NotAnObject(c_location.to_string()));
    };

    let name_old = match dict_manifest.get("name") {
        Some(Value::String(v)) => v.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    };
    dict_manifest.insert("name".to_string(), Value::String(name_new.to_string()));

    let txt_manifest =
        serde_json::to_string_pretty(&value_manifest).map_err(|e| ManifestError::Parse {
            location: c_location.to_string(),
            source: e,
        })?;
    Ok((txt_manifest, name_old))
}

/// Rewrite `name` in `dir_destination/<c_manifest_file_name>`.
///
/// The document is written back with 2-space indentation, original key order
/// and unescaped non-ASCII text.
pub fn rewrite_manifest_name<P: AsRef<Path>>(
    dir_destination: P,
    name_new: &str,
    c_manifest_file_name: &str,
) -> Result<Option<SpecManifestRename>, ManifestError> {
    let path_manifest = dir_destination.as_ref().join(c_manifest_file_name);
    if !path_manifest.is_file() {
        return Ok(None);
    }

    let raw_manifest = fs::read(&path_manifest).map_err(|e| ManifestError::Io {
        path: path_manifest.clone(),
        source: e,
    })?;
    let (txt_manifest, name_old) = apply_manifest_name(
        &raw_manifest,
        name_new,
        &path_manifest.display().to_string(),
    )?;
    fs::write(&path_manifest, txt_manifest).map_err(|e| ManifestError::Io {
        path: path_manifest.clone(),
        source: e,
    })?;

    tracing::info!(old = %name_old, new = %name_new, "manifest name updated");
    Ok(Some(SpecManifestRename {
        name_old,
        name_new: name_new.to_string(),
    }))
}

/// Rewrite `name` in the `c_manifest_file_name` entry of a zip archive.
///
/// Zip entries cannot be edited in place, so the archive is rebuilt into a
/// temporary file next to it: every other entry is copied raw (no
/// recompression), the updated manifest takes the original entry's position,
/// and the temporary file is renamed over the original in one step.
pub fn rewrite_manifest_name_in_archive<P: AsRef<Path>>(
    path_archive: P,
    name_new: &str,
    c_manifest_file_name: &str,
) -> Result<Option<SpecManifestRename>, ManifestError> {
    let path_archive = path_archive.as_ref();
    let err_zip = |e: ZipError| ManifestError::Archive {
        path: path_archive.to_path_buf(),
        source: e,
    };
    let err_io = |path: &Path| {
        let path = path.to_path_buf();
        move |e: std::io::Error| ManifestError::Io { path, source: e }
    };

    let file_archive = File::open(path_archive).map_err(err_io(path_archive))?;
    let mut archive = ZipArchive::new(file_archive).map_err(err_zip)?;

    let (raw_manifest, datetime_manifest, mode_manifest) =
        match archive.by_name(c_manifest_file_name) {
            Ok(mut entry) => {
                let mut raw_manifest = Vec::new();
                entry
                    .read_to_end(&mut raw_manifest)
                    .map_err(err_io(path_archive))?;
                (raw_manifest, entry.last_modified(), entry.unix_mode())
            }
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(err_zip(e)),
        };

    let c_location = format!("{}!{c_manifest_file_name}", path_archive.display());
    let (txt_manifest, name_old) = apply_manifest_name(&raw_manifest, name_new, &c_location)?;

    let path_dir_parent: PathBuf = match path_archive.parent() {
        Some(v) if !v.as_os_str().is_empty() => v.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file_tmp = NamedTempFile::new_in(&path_dir_parent).map_err(err_io(&path_dir_parent))?;

    {
        let mut options_manifest =
            derive_entry_options(N_COMPRESSION_LEVEL_DEFAULT).last_modified_time(datetime_manifest);
        if let Some(mode) = mode_manifest {
            options_manifest = options_manifest.unix_permissions(mode);
        }

        let mut writer = ZipWriter::new(file_tmp.as_file_mut());
        let mut b_if_manifest_written = false;
        for n_idx in 0..archive.len() {
            let entry = archive.by_index_raw(n_idx).map_err(err_zip)?;
            if entry.name() != c_manifest_file_name {
                writer.raw_copy_file(entry).map_err(err_zip)?;
                continue;
            }
            // Duplicate manifest entries collapse into one.
            if !b_if_manifest_written {
                writer
                    .start_file(c_manifest_file_name, options_manifest)
                    .map_err(err_zip)?;
                writer
                    .write_all(txt_manifest.as_bytes())
                    .map_err(err_io(path_archive))?;
                b_if_manifest_written = true;
            }
        }
        writer.finish().map_err(err_zip)?;
    }
    // The temporary file starts out owner-only; keep the archive's own mode.
    let meta_archive = fs::metadata(path_archive).map_err(err_io(path_archive))?;
    file_tmp
        .as_file()
        .set_permissions(meta_archive.permissions())
        .map_err(err_io(path_archive))?;
    // Release the reader before replacing the file it points at.
    drop(archive);

    file_tmp
        .persist(path_archive)
        .map_err(|e| ManifestError::Persist {
            path: path_archive.to_path_buf(),
            source: e,
        })?;

    tracing::info!(old = %name_old, new = %name_new, "manifest name updated in archive");
    Ok(Some(SpecManifestRename {
        name_old,
        name_new: name_new.to_string(),
    }))
}
