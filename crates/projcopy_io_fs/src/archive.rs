//! Zip archive writer.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::filter::SpecExcludeRules;
use crate::report::{ReportTransfer, ReportTransferBuilder};
use crate::spec::{SpecTransferError, SpecTransferOptions, TransferError};
use crate::util::{derive_entry_name, derive_path_inside};
use crate::walk::{TransferSink, TreeWalker};

/// Deflate options shared by every entry of one archive.
pub(crate) fn derive_entry_options(n_compression_level: i32) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(n_compression_level.clamp(0, 9)))
}

/// Zip timestamp (UTC, two-second resolution) for a file's modification time.
///
/// Times outside the DOS range (1980..=2107) fall back to 1980-01-01.
pub(crate) fn derive_entry_datetime(meta_file: &fs::Metadata) -> zip::DateTime {
    let Ok(time_modified) = meta_file.modified() else {
        return zip::DateTime::default();
    };
    let date_time = time::OffsetDateTime::from(time_modified);
    let Ok(n_year) = u16::try_from(date_time.year()) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        n_year,
        u8::from(date_time.month()),
        date_time.day(),
        date_time.hour(),
        date_time.minute(),
        date_time.second(),
    )
    .unwrap_or_default()
}

struct SinkArchive {
    writer: ZipWriter<File>,
    options_entry: FileOptions,
}

impl SinkArchive {
    fn write_entry(&mut self, path_file_src: &Path, c_entry_name: &str) -> io::Result<()> {
        let mut file_src = File::open(path_file_src)?;
        let meta_file_src = file_src.metadata()?;

        let mut options_entry = self
            .options_entry
            .last_modified_time(derive_entry_datetime(&meta_file_src))
            .large_file(meta_file_src.len() >= u64::from(u32::MAX));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options_entry = options_entry.unix_permissions(meta_file_src.permissions().mode());
        }

        // Source is read in full first: a read failure must not leave an
        // opened, truncated entry behind.
        let n_capacity = usize::try_from(meta_file_src.len()).unwrap_or(0);
        let mut raw_file_src = Vec::with_capacity(n_capacity);
        file_src.read_to_end(&mut raw_file_src)?;

        self.writer
            .start_file(c_entry_name, options_entry)
            .map_err(io::Error::other)?;
        self.writer.write_all(&raw_file_src)
    }
}

impl TransferSink for SinkArchive {
    fn enter_dir(&mut self, _path_rel: &Path) -> Result<(), SpecTransferError> {
        Ok(())
    }

    fn transfer_file(
        &mut self,
        path_file_src: &Path,
        path_rel: &Path,
    ) -> Result<(), SpecTransferError> {
        let c_entry_name = derive_entry_name(path_rel);
        self.write_entry(path_file_src, &c_entry_name)
            .map_err(|e| SpecTransferError {
                path: path_file_src.to_path_buf(),
                exception: format!("Error adding to ZIP: {e}"),
            })
    }
}

/// Stream the non-excluded files of `dir_source` into a new zip archive.
///
/// Entry names are `/`-separated paths relative to `dir_source`; entries use
/// Deflate at [`SpecTransferOptions::n_compression_level`]. When the archive
/// file cannot be created, the returned report holds exactly one error and no
/// copied files. Per-entry failures are recorded and the walk continues.
pub fn create_archive<P, Q, F>(
    dir_source: P,
    path_archive: Q,
    spec_tx_options: &SpecTransferOptions,
    mut on_progress: F,
) -> Result<ReportTransfer, TransferError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(u64),
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_archive = path_archive.as_ref().to_path_buf();

    if !path_dir_src.is_dir() {
        return Err(TransferError::SourceNotDirectory(path_dir_src));
    }
    let spec_ex_rules = SpecExcludeRules::from_options(spec_tx_options)?;

    let file_archive = match File::create(&path_archive) {
        Ok(v) => v,
        Err(e) => {
            let mut builder_tx_report = ReportTransferBuilder::default();
            builder_tx_report.add_error(path_archive, format!("Error creating ZIP file: {e}"));
            return Ok(builder_tx_report.build());
        }
    };
    let path_rel_ignored: Option<PathBuf> = derive_path_inside(&path_dir_src, &path_archive);

    tracing::info!(
        src = %path_dir_src.display(),
        archive = %path_archive.display(),
        "archive started"
    );
    let mut sink = SinkArchive {
        writer: ZipWriter::new(file_archive),
        options_entry: derive_entry_options(spec_tx_options.n_compression_level),
    };
    let mut builder_tx_report = TreeWalker::new(
        &path_dir_src,
        &spec_ex_rules,
        spec_tx_options.n_progress_interval,
        &mut on_progress,
    )
    .with_ignored(path_rel_ignored)
    .run(&mut sink);

    if let Err(e) = sink.writer.finish() {
        builder_tx_report.add_error(path_archive, format!("Error finalizing ZIP file: {e}"));
    }
    let report = builder_tx_report.build();
    tracing::info!("{}", report.format("[ZIP]"));
    Ok(report)
}
