use std::path::Path;

/// Extension of every produced e-book.
pub const OUTPUT_EXTENSION: &str = "epub";

/// Removes characters forbidden in file names and normalises whitespace.
///
/// Drops `\ / : * ? " < > |`, collapses runs of whitespace into one space and
/// trims both ends.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !is_forbidden(*c)).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// File name of the e-book produced for the `index`-th archive (1-based).
///
/// With a series the name is `{series} T°{index}.epub`; otherwise the source
/// archive's base name is kept.
pub fn output_file_name(series: Option<&str>, index: usize, source: &Path) -> String {
    let series = series.map(sanitize_filename).filter(|s| !s.is_empty());
    let base = match series {
        Some(series) => format!("{series} T°{index}"),
        None => source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("volume {index}")),
    };
    format!("{base}.{OUTPUT_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stemless_source_gets_a_numbered_name() {
        assert_eq!(output_file_name(None, 4, Path::new("/")), "volume 4.epub");
    }

    #[test]
    fn blank_series_falls_back_to_source_name() {
        assert_eq!(
            output_file_name(Some(" ?* "), 1, Path::new("/c/One Piece 01.cbz")),
            "One Piece 01.epub"
        );
    }
}
