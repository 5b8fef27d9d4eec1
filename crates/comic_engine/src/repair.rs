//! Best-effort archive repair.
//!
//! Every readable entry of the source archive is extracted into a scratch tree
//! and written back into a fresh, uncompressed archive: the working copy fed
//! to the converter. A source that cannot be read completely is reported as
//! `Fixed`; no recovery beyond skipping unreadable entries is attempted.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use engine_logging::{engine_debug, engine_warn};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::types::RepairStatus;

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("cannot open archive {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("cannot read entry {entry} of {path}: {message}")]
    Entry {
        path: PathBuf,
        entry: String,
        message: String,
    },
    #[error("cannot write working copy {path}: {message}")]
    WorkingCopy { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    pub status: RepairStatus,
    /// Uncompressed rebuild of the source; `None` when it could not be written.
    pub working_copy: Option<PathBuf>,
    /// Number of entries carried into the working copy.
    pub recovered_entries: usize,
}

/// Repairs `source` into a working copy stored under `workspace`.
///
/// `index` is the 1-based batch position and keeps working copies of
/// same-named archives apart.
pub fn repair_archive(source: &Path, workspace: &Path, index: usize) -> RepairOutcome {
    let scratch = match tempfile::Builder::new()
        .prefix("cbz_repair_")
        .tempdir_in(workspace)
    {
        Ok(dir) => dir,
        Err(err) => {
            engine_warn!("[REPAIR] no scratch dir for {}: {}", source.display(), err);
            return unreadable();
        }
    };

    let (entries, read_error) = extract_entries(source, scratch.path());
    if let Some(err) = &read_error {
        engine_warn!("[REPAIR] {}", err);
    }

    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let working_copy = workspace.join(format!("{index:04}_{stem}.cbz"));
    if let Err(err) = write_stored_archive(scratch.path(), &entries, &working_copy) {
        engine_warn!("[REPAIR] {}", err);
        let _ = fs::remove_file(&working_copy);
        return unreadable();
    }

    let status = if read_error.is_none() {
        RepairStatus::Intact
    } else {
        RepairStatus::Fixed
    };
    engine_debug!(
        "[REPAIR] {} -> {:?} ({} entries)",
        source.display(),
        status,
        entries.len()
    );
    RepairOutcome {
        status,
        working_copy: Some(working_copy),
        recovered_entries: entries.len(),
    }
}

fn unreadable() -> RepairOutcome {
    RepairOutcome {
        status: RepairStatus::Unreadable,
        working_copy: None,
        recovered_entries: 0,
    }
}

/// Extracts every readable file entry into `dest`, in archive order.
///
/// Returns the extracted relative paths and the first read error, if any.
fn extract_entries(source: &Path, dest: &Path) -> (Vec<PathBuf>, Option<RepairError>) {
    let mut extracted = Vec::new();
    let mut first_error: Option<RepairError> = None;

    let archive = File::open(source)
        .map_err(|e| e.to_string())
        .and_then(|file| ZipArchive::new(file).map_err(|e| e.to_string()));
    let mut archive = match archive {
        Ok(archive) => archive,
        Err(message) => {
            let err = RepairError::Open {
                path: source.to_path_buf(),
                message,
            };
            return (extracted, Some(err));
        }
    };

    for i in 0..archive.len() {
        let result = read_entry(&mut archive, i, dest);
        match result {
            Ok(Some(relative)) => extracted.push(relative),
            Ok(None) => {}
            Err((entry, message)) => {
                if first_error.is_none() {
                    first_error = Some(RepairError::Entry {
                        path: source.to_path_buf(),
                        entry,
                        message,
                    });
                }
            }
        }
    }
    (extracted, first_error)
}

/// Reads entry `index` into `dest`; `Ok(None)` for directories.
fn read_entry(
    archive: &mut ZipArchive<File>,
    index: usize,
    dest: &Path,
) -> Result<Option<PathBuf>, (String, String)> {
    let mut entry = archive
        .by_index(index)
        .map_err(|e| (format!("#{index}"), e.to_string()))?;
    let name = entry.name().to_string();
    if entry.is_dir() {
        return Ok(None);
    }
    let relative = entry
        .enclosed_name()
        .ok_or_else(|| (name.clone(), "unsafe entry path".to_string()))?;

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| (name.clone(), e.to_string()))?;

    let target = dest.join(&relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| (name.clone(), e.to_string()))?;
    }
    fs::write(&target, &bytes).map_err(|e| (name, e.to_string()))?;
    Ok(Some(relative))
}

/// Writes the extracted files into a new archive without compression.
fn write_stored_archive(
    root: &Path,
    entries: &[PathBuf],
    dest: &Path,
) -> Result<(), RepairError> {
    let fail = |message: String| RepairError::WorkingCopy {
        path: dest.to_path_buf(),
        message,
    };

    let file = File::create(dest).map_err(|e| fail(e.to_string()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for relative in entries {
        let bytes = fs::read(root.join(relative)).map_err(|e| fail(e.to_string()))?;
        writer
            .start_file(archive_name(relative), options)
            .map_err(|e| fail(e.to_string()))?;
        writer.write_all(&bytes).map_err(|e| fail(e.to_string()))?;
    }
    writer.finish().map_err(|e| fail(e.to_string()))?;
    Ok(())
}

/// Archive member name with `/` separators on every platform.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
