use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_error, engine_info, engine_warn};

use crate::convert::{Converter, EbookConvert};
use crate::pipeline::{run_pipeline, ChannelProgressSink, PipelineOutcome};
use crate::types::{ConversionJob, EngineEvent, PipelineError};

/// Default capacity of the worker-to-interactive event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Replaces `ebook-convert` when set.
    pub converter_program: Option<PathBuf>,
    pub event_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            converter_program: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

enum EngineCommand {
    Run(ConversionJob),
}

/// Owns the worker thread; at most one batch runs at a time.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    busy: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Self {
        let converter: Arc<dyn Converter> = match settings.converter_program {
            Some(program) => Arc::new(EbookConvert::with_program(program)),
            None => Arc::new(EbookConvert::new()),
        };
        Self::with_converter(converter, settings.event_capacity)
    }

    pub fn with_converter(converter: Arc<dyn Converter>, event_capacity: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::sync_channel(event_capacity.max(1));
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = Arc::clone(&busy);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(converter.as_ref(), command, &event_tx, &worker_busy);
            }
        });

        Self {
            cmd_tx,
            event_rx,
            busy,
        }
    }

    /// Queues `job`; returns `false` when a batch is already running.
    pub fn start(&self, job: ConversionJob) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            engine_warn!("[ENGINE] batch already running; start ignored");
            return false;
        }
        if self.cmd_tx.send(EngineCommand::Run(job)).is_err() {
            engine_error!("[ENGINE] worker thread is gone");
            self.busy.store(false, Ordering::Release);
            return false;
        }
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn handle_command(
    converter: &dyn Converter,
    command: EngineCommand,
    event_tx: &mpsc::SyncSender<EngineEvent>,
    busy: &AtomicBool,
) {
    match command {
        EngineCommand::Run(job) => {
            engine_info!("[ENGINE] batch of {} file(s)", job.input_files.len());
            let sink = ChannelProgressSink::new(event_tx.clone());
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_pipeline(&job, converter, &sink)
            }))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                engine_error!("[ENGINE] pipeline panicked: {}", message);
                PipelineOutcome::aborted(&job, PipelineError::Worker { message })
            });

            // Cleared first so the finished event always finds the engine idle.
            busy.store(false, Ordering::Release);
            let _ = event_tx.send(EngineEvent::Finished {
                summary: Box::new(outcome.summary),
                fatal: outcome.fatal,
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
