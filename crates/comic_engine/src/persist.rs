//! Output folder checks and crash-safe text files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("cannot write into {}: {source}", path.display())]
    NotWritable { path: PathBuf, source: io::Error },
}

/// Creates `dir` (and parents) when missing and checks files can be made in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Err(PersistError::NotADirectory(dir.to_path_buf())),
        Ok(_) => {}
        Err(_) => fs::create_dir_all(dir).map_err(|source| PersistError::Create {
            path: dir.to_path_buf(),
            source,
        })?,
    }
    NamedTempFile::new_in(dir).map_err(|source| PersistError::NotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Replaces `target` with `text` encoded as UTF-8.
///
/// The bytes go to a sibling temp file that is renamed over `target`, so a
/// reader sees either the old file or the complete new one.
pub fn replace_text_file(target: &Path, text: &str) -> Result<(), PersistError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let not_writable = |source: io::Error| PersistError::NotWritable {
        path: target.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(not_writable)?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file_mut().sync_all())
        .map_err(not_writable)?;
    tmp.persist(target).map_err(|err| not_writable(err.error))?;
    Ok(())
}
