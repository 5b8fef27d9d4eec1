//! Cover image detection inside a comic archive.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use zip::ZipArchive;

/// Extensions recognised as page images, lower case.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cannot open archive {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("cannot extract cover {entry}: {message}")]
    Extract { entry: String, message: String },
}

pub fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Picks the cover among archive member names.
///
/// The first image, in archive order, whose file name contains "cover" (any
/// case) wins; otherwise the lexicographically first image path.
pub fn select_cover<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let images: Vec<&str> = names
        .into_iter()
        .filter(|name| !name.ends_with('/') && is_image(name))
        .collect();

    let named_cover = images.iter().copied().find(|name| {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        file_name.to_lowercase().contains("cover")
    });
    named_cover.or_else(|| images.iter().copied().min())
}

/// Extracts the cover of `archive` into a temporary file inside `dir`.
///
/// `Ok(None)` when the archive holds no image. The file is deleted when the
/// returned handle drops.
pub fn extract_cover(archive: &Path, dir: &Path) -> Result<Option<NamedTempFile>, CoverError> {
    let open_error = |message: String| CoverError::Open {
        path: archive.to_path_buf(),
        message,
    };
    let file = File::open(archive).map_err(|e| open_error(e.to_string()))?;
    let mut zip = ZipArchive::new(file).map_err(|e| open_error(e.to_string()))?;

    let names: Vec<String> = zip.file_names().map(str::to_string).collect();
    let Some(entry) = select_cover(names.iter().map(String::as_str)) else {
        return Ok(None);
    };

    let extract_error = |message: String| CoverError::Extract {
        entry: entry.to_string(),
        message,
    };
    let suffix = Path::new(entry)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut cover = tempfile::Builder::new()
        .prefix("cover_")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| extract_error(e.to_string()))?;
    let mut member = zip.by_name(entry).map_err(|e| extract_error(e.to_string()))?;
    io::copy(&mut member, cover.as_file_mut()).map_err(|e| extract_error(e.to_string()))?;
    Ok(Some(cover))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_cover_beats_first_page() {
        let names = ["001.jpg", "extras/Cover.PNG", "notes.txt"];
        assert_eq!(select_cover(names), Some("extras/Cover.PNG"));
    }

    #[test]
    fn first_image_is_the_fallback() {
        let names = ["b/002.webp", "info.xml", "a/010.jpeg"];
        assert_eq!(select_cover(names), Some("a/010.jpeg"));
    }

    #[test]
    fn folder_named_cover_does_not_count() {
        let names = ["covers/002.jpg", "001.jpg"];
        assert_eq!(select_cover(names), Some("001.jpg"));
    }

    #[test]
    fn no_images_no_cover() {
        assert_eq!(select_cover(["ComicInfo.xml"]), None);
    }
}
