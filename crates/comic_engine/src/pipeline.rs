//! Repair then convert a batch, reporting progress as it goes.
//!
//! Per-file failures are recorded in the file's outcome and never stop the
//! batch; only [`PipelineError`] aborts it.

use std::path::{Path, PathBuf};
use std::sync::mpsc::SyncSender;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use thiserror::Error;

use crate::convert::{ConvertError, ConvertRequest, Converter};
use crate::cover::extract_cover;
use crate::filename::output_file_name;
use crate::persist::{ensure_output_dir, PersistError};
use crate::repair::repair_archive;
use crate::report::SessionSummary;
use crate::types::{
    ConversionJob, ConvertStatus, EngineEvent, FileOutcome, PhaseCounter, PipelineError,
    RepairStatus,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: SyncSender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: SyncSender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Result of a whole batch; `fatal` is set when the batch was aborted.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub summary: SessionSummary,
    pub fatal: Option<PipelineError>,
}

impl PipelineOutcome {
    /// Outcome of a batch that stopped before any file was processed.
    pub fn aborted(job: &ConversionJob, error: PipelineError) -> Self {
        let mut summary = SessionSummary::start(job);
        summary.outcomes = job
            .input_files
            .iter()
            .map(|source| FileOutcome::new(source, RepairStatus::Unreadable))
            .collect();
        summary.finish();
        Self {
            summary,
            fatal: Some(error),
        }
    }
}

#[derive(Debug, Error)]
enum FileError {
    #[error(transparent)]
    OutputDir(#[from] PersistError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Runs both phases over `job`, blocking the calling thread.
///
/// Every temporary file lives under one scratch directory removed before
/// this returns.
pub fn run_pipeline(
    job: &ConversionJob,
    converter: &dyn Converter,
    sink: &dyn ProgressSink,
) -> PipelineOutcome {
    run_pipeline_in(job, converter, sink, &std::env::temp_dir())
}

/// [`run_pipeline`] with the scratch directory created under `scratch_root`.
pub fn run_pipeline_in(
    job: &ConversionJob,
    converter: &dyn Converter,
    sink: &dyn ProgressSink,
    scratch_root: &Path,
) -> PipelineOutcome {
    engine_info!(
        "[PIPELINE] starting batch of {} file(s)",
        job.input_files.len()
    );
    let workspace = match tempfile::Builder::new()
        .prefix("cbz2epub_")
        .tempdir_in(scratch_root)
    {
        Ok(dir) => dir,
        Err(err) => {
            engine_error!("[PIPELINE] cannot create working directory: {}", err);
            return PipelineOutcome::aborted(
                job,
                PipelineError::Workspace {
                    message: err.to_string(),
                },
            );
        }
    };

    let mut summary = SessionSummary::start(job);
    let fatal = run_phases(job, converter, sink, workspace.path(), &mut summary).err();
    if let Err(err) = workspace.close() {
        engine_warn!("[PIPELINE] cannot remove working directory: {}", err);
    }
    summary.finish();

    engine_info!(
        "[PIPELINE] done: {} converted, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    PipelineOutcome { summary, fatal }
}

fn run_phases(
    job: &ConversionJob,
    converter: &dyn Converter,
    sink: &dyn ProgressSink,
    workspace: &Path,
    summary: &mut SessionSummary,
) -> Result<(), PipelineError> {
    let total = job.input_files.len();

    let mut working_copies = Vec::with_capacity(total);
    for (i, source) in job.input_files.iter().enumerate() {
        engine_debug!("[REPAIR] processing {}", source.display());
        let repaired = repair_archive(source, workspace, i + 1);
        summary.outcomes.push(FileOutcome::new(source, repaired.status));
        working_copies.push(repaired.working_copy);
        post(sink, PhaseCounter::Repaired, fraction(i + 1, total));
    }
    post(sink, PhaseCounter::Repaired, 1.0);

    let program = converter.locate().inspect_err(|err| {
        engine_error!("[PIPELINE] {}", err);
    })?;

    for (i, working_copy) in working_copies.iter().enumerate() {
        let index = i + 1;
        if let Some(working_copy) = working_copy {
            post(sink, PhaseCounter::Converted, (index as f64 - 0.5) / total as f64);
            let outcome = &summary.outcomes[i];
            let status =
                match convert_one(job, converter, &program, working_copy, &outcome.source, index, workspace) {
                    Ok(path) => ConvertStatus::Success(path),
                    Err(err) => {
                        engine_warn!("[CONVERT] {}: {}", outcome.name, err);
                        ConvertStatus::Failed
                    }
                };
            summary.outcomes[i].convert = status;
        }
        post(sink, PhaseCounter::Converted, fraction(index, total));
    }
    post(sink, PhaseCounter::Converted, 1.0);
    Ok(())
}

fn convert_one(
    job: &ConversionJob,
    converter: &dyn Converter,
    program: &Path,
    working_copy: &Path,
    source: &Path,
    index: usize,
    workspace: &Path,
) -> Result<PathBuf, FileError> {
    let output_dir = job.resolved_output_dir();
    ensure_output_dir(&output_dir)?;
    let output = output_dir.join(output_file_name(job.series(), index, source));

    let cover = match extract_cover(working_copy, workspace) {
        Ok(cover) => cover,
        Err(err) => {
            engine_warn!("[CONVERT] no cover for {}: {}", source.display(), err);
            None
        }
    };
    let request = ConvertRequest {
        input: working_copy,
        output: &output,
        author: job.author(),
        series: job.series(),
        cover: cover.as_ref().map(|file| file.path()),
    };
    let result = converter.convert(program, &request);
    drop(cover);
    result?;
    Ok(output)
}

fn post(sink: &dyn ProgressSink, counter: PhaseCounter, fraction: f64) {
    sink.emit(EngineEvent::Progress { counter, fraction });
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    }
}
