use std::path::PathBuf;

use crate::{BatchResult, Notice, SceneId};

/// Availability of every interactive control on the current scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    pub next: bool,
    pub reset: bool,
    pub pick_archives: bool,
    pub pick_output: bool,
    pub convert: bool,
    pub open_log: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub scene: SceneId,
    pub eligibility: Eligibility,
    pub input_count: usize,
    pub output_dir: Option<PathBuf>,
    /// Output folder shortened for display on the final scene.
    pub output_hint: String,
    pub author: Option<String>,
    pub series: Option<String>,
    pub pipeline_running: bool,
    pub last_batch: Option<BatchResult>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}
