use std::path::PathBuf;

/// Source of file and folder selections; `None` means the user cancelled.
pub trait Picker {
    fn pick_archive_files(&mut self) -> Option<Vec<PathBuf>>;
    fn pick_directory(&mut self) -> Option<PathBuf>;
}

/// Answers each picker once with selections known up front, then cancels.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    archives: Option<Vec<PathBuf>>,
    directory: Option<PathBuf>,
}

impl ScriptedPicker {
    pub fn new(archives: Vec<PathBuf>, directory: PathBuf) -> Self {
        Self {
            archives: Some(archives).filter(|files| !files.is_empty()),
            directory: Some(directory),
        }
    }
}

impl Picker for ScriptedPicker {
    fn pick_archive_files(&mut self) -> Option<Vec<PathBuf>> {
        self.archives.take()
    }

    fn pick_directory(&mut self) -> Option<PathBuf> {
        self.directory.take()
    }
}
