mod common;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use comic_engine::{
    ConversionJob, ConvertError, ConvertRequest, ConvertStatus, Converter, EngineEvent,
    EngineHandle, PhaseCounter, PipelineError,
};
use tempfile::TempDir;

use common::{comic, init_logging, FakeConverter};

/// Converter that waits for the test to release it.
struct GatedConverter {
    gate: Mutex<Receiver<()>>,
}

impl GatedConverter {
    fn new() -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (Self { gate: Mutex::new(rx) }, tx)
    }
}

impl Converter for GatedConverter {
    fn locate(&self) -> Result<PathBuf, PipelineError> {
        Ok(PathBuf::from("gated"))
    }

    fn convert(&self, _program: &Path, request: &ConvertRequest<'_>) -> Result<(), ConvertError> {
        let _ = self.gate.lock().unwrap().recv_timeout(Duration::from_secs(10));
        std::fs::write(request.output, b"epub").unwrap();
        Ok(())
    }
}

fn wait_for_finish(engine: &EngineHandle) -> (Vec<EngineEvent>, EngineEvent) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut progress = Vec::new();
    while Instant::now() < deadline {
        match engine.try_recv() {
            Some(event @ EngineEvent::Finished { .. }) => return (progress, event),
            Some(event) => progress.push(event),
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }
    panic!("engine never finished");
}

fn job_for(inputs: &TempDir, out: &TempDir, names: &[&str]) -> ConversionJob {
    ConversionJob {
        input_files: names.iter().map(|n| comic(inputs.path(), n)).collect(),
        output_dir: Some(out.path().to_path_buf()),
        author: None,
        series: Some("Blacksad".to_string()),
    }
}

#[test]
fn finished_event_carries_the_summary() {
    init_logging();
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = EngineHandle::with_converter(Arc::new(FakeConverter::default()), 64);

    assert!(engine.start(job_for(&inputs, &out, &["a.cbz", "b.cbz"])));
    let (progress, finished) = wait_for_finish(&engine);

    assert!(!engine.is_busy());
    assert!(progress.iter().any(|e| matches!(
        e,
        EngineEvent::Progress { counter: PhaseCounter::Converted, fraction } if *fraction == 1.0
    )));
    let EngineEvent::Finished { summary, fatal } = finished else {
        unreachable!()
    };
    assert_eq!(fatal, None);
    assert_eq!(
        summary.outcomes[1].convert,
        ConvertStatus::Success(out.path().join("Blacksad T°2.epub"))
    );
    assert!(engine.try_recv().is_none());
}

#[test]
fn second_start_while_running_is_ignored() {
    init_logging();
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (converter, release) = GatedConverter::new();
    let engine = EngineHandle::with_converter(Arc::new(converter), 64);

    assert!(engine.start(job_for(&inputs, &out, &["a.cbz"])));
    assert!(engine.is_busy());
    assert!(!engine.start(job_for(&inputs, &out, &["b.cbz"])));

    release.send(()).unwrap();
    let (_, finished) = wait_for_finish(&engine);
    let EngineEvent::Finished { summary, .. } = finished else {
        unreachable!()
    };
    assert_eq!(summary.found_files, ["a.cbz"]);

    // Idle again: the next batch is accepted.
    release.send(()).unwrap();
    assert!(engine.start(job_for(&inputs, &out, &["c.cbz"])));
    let (_, finished) = wait_for_finish(&engine);
    assert!(matches!(finished, EngineEvent::Finished { fatal: None, .. }));
}

#[test]
fn missing_tool_is_reported_once_through_finished() {
    let inputs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = EngineHandle::with_converter(Arc::new(FakeConverter::missing()), 4);

    assert!(engine.start(job_for(&inputs, &out, &["a.cbz", "b.cbz", "c.cbz"])));
    let (_, finished) = wait_for_finish(&engine);

    let EngineEvent::Finished { fatal, summary } = finished else {
        unreachable!()
    };
    assert!(matches!(fatal, Some(PipelineError::ToolNotFound { .. })));
    assert_eq!(summary.succeeded(), 0);
    assert!(!engine.is_busy());
}
