use comic_core::{
    AppViewModel, BatchResult, ConversionRequest, Effect, Msg, ProgressAggregator,
};
use comic_engine::{ConversionJob, EngineEvent, EngineHandle, SessionReport, SessionSummary};
use engine_logging::{engine_info, engine_warn};

use super::picker::Picker;
use super::renderer::Renderer;

/// Executes effects produced by `update` and turns engine events into messages.
pub struct EffectRunner<P: Picker> {
    engine: EngineHandle,
    picker: P,
    last_summary: Option<SessionSummary>,
}

impl<P: Picker> EffectRunner<P> {
    pub fn new(engine: EngineHandle, picker: P) -> Self {
        Self {
            engine,
            picker,
            last_summary: None,
        }
    }

    /// Summary of the last finished batch, kept for report regeneration.
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Runs `effects` in order; returns the messages they produced.
    pub fn run(
        &mut self,
        effects: Vec<Effect>,
        view: &AppViewModel,
        renderer: &mut dyn Renderer,
        progress: &mut ProgressAggregator,
    ) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::RenderScene(_) => renderer.render_scene(view),
                Effect::RefreshEligibility => renderer.refresh_eligibility(view),
                Effect::OpenArchivePicker => {
                    follow_ups.push(match self.picker.pick_archive_files() {
                        Some(files) => Msg::ArchivesPicked(files),
                        None => Msg::PickerCancelled,
                    });
                }
                Effect::OpenDirectoryPicker => {
                    follow_ups.push(match self.picker.pick_directory() {
                        Some(dir) => Msg::OutputDirPicked(dir),
                        None => Msg::PickerCancelled,
                    });
                }
                Effect::StartConversion(request) => {
                    engine_info!(
                        "StartConversion files={} output={:?}",
                        request.input_files.len(),
                        request.output_dir
                    );
                    if !self.engine.start(job_from_request(request)) {
                        engine_warn!("StartConversion ignored: engine busy");
                    }
                }
                Effect::ResetProgress => progress.reset_all(),
                Effect::WriteReport => follow_ups.push(self.write_report()),
                Effect::ShowNotice(notice) => renderer.show_notice(&notice),
            }
        }
        follow_ups
    }

    /// Drains pending engine events without blocking.
    pub fn poll_engine(&mut self, progress: &mut ProgressAggregator) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            match event {
                EngineEvent::Progress { counter, fraction } => {
                    progress.set_target(counter.name(), fraction);
                }
                EngineEvent::Finished { summary, fatal } => {
                    let result = BatchResult {
                        processed: summary.processed(),
                        succeeded: summary.succeeded(),
                        failed: summary.failed(),
                        fatal: fatal.map(|err| err.to_string()),
                    };
                    self.last_summary = Some(*summary);
                    msgs.push(Msg::PipelineFinished(result));
                }
            }
        }
        msgs
    }

    fn write_report(&self) -> Msg {
        let Some(summary) = &self.last_summary else {
            return Msg::ReportWriteFailed("no finished conversion".to_string());
        };
        match SessionReport::new(summary).write_to_file(&summary.output_dir) {
            Ok(path) => {
                engine_info!("Session log written to {}", path.display());
                Msg::ReportWritten(path)
            }
            Err(err) => {
                engine_warn!("Session log not written: {}", err);
                Msg::ReportWriteFailed(err.to_string())
            }
        }
    }
}

fn job_from_request(request: ConversionRequest) -> ConversionJob {
    ConversionJob {
        input_files: request.input_files,
        output_dir: request.output_dir,
        author: request.author,
        series: request.series,
    }
}
