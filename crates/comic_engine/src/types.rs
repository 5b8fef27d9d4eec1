use std::fmt;
use std::path::{Path, PathBuf};

use crate::report::SessionSummary;

/// Snapshot of the user's selections taken when a batch starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversionJob {
    pub input_files: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub author: Option<String>,
    pub series: Option<String>,
}

impl ConversionJob {
    /// Output folder, falling back to the current directory when none was chosen.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Folder of the first archive, reported as the input folder.
    pub fn input_dir(&self) -> Option<PathBuf> {
        self.input_files
            .first()
            .and_then(|file| file.parent())
            .map(Path::to_path_buf)
    }

    pub fn author(&self) -> Option<&str> {
        non_blank(self.author.as_deref())
    }

    pub fn series(&self) -> Option<&str> {
        non_blank(self.series.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStatus {
    /// Every entry could be read.
    Intact,
    /// Reading failed; a working copy was rebuilt from whatever was readable.
    Fixed,
    /// Not even a working copy could be produced.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStatus {
    Success(PathBuf),
    Failed,
    /// Never reached the convert phase.
    Skipped,
}

/// Per-archive result of both phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// File name shown in the report.
    pub name: String,
    pub repair: RepairStatus,
    pub convert: ConvertStatus,
}

impl FileOutcome {
    pub fn new(source: &Path, repair: RepairStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            name: display_name(source),
            repair,
            convert: ConvertStatus::Skipped,
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Progress counters the worker reports on, one per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseCounter {
    Repaired,
    Converted,
}

impl PhaseCounter {
    pub const ALL: [PhaseCounter; 2] = [PhaseCounter::Repaired, PhaseCounter::Converted];

    pub fn name(self) -> &'static str {
        match self {
            PhaseCounter::Repaired => "repaired",
            PhaseCounter::Converted => "converted",
        }
    }
}

impl fmt::Display for PhaseCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Batch-level failure that aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("{program} not found in PATH; cannot convert")]
    ToolNotFound { program: String },
    #[error("cannot create working directory: {message}")]
    Workspace { message: String },
    #[error("conversion worker stopped unexpectedly: {message}")]
    Worker { message: String },
}

/// Messages from the worker to the interactive side.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress {
        counter: PhaseCounter,
        fraction: f64,
    },
    /// Sent exactly once per batch, after all temporary files are gone.
    Finished {
        summary: Box<SessionSummary>,
        fatal: Option<PipelineError>,
    },
}
