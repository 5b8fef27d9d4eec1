#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use comic_engine::{
    ConvertError, ConvertRequest, Converter, EngineEvent, PhaseCounter, PipelineError,
    ProgressSink,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Writes a deflated archive with the given members.
pub fn write_archive(path: &Path, members: &[(&str, &str)]) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, bytes) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path.to_path_buf()
}

pub fn comic(dir: &Path, name: &str) -> PathBuf {
    write_archive(
        &dir.join(name),
        &[
            ("001.jpg", "page one"),
            ("002.jpg", "page two"),
            ("ComicInfo.xml", "<ComicInfo/>"),
        ],
    )
}

pub fn garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"definitely not a zip archive").unwrap();
    path
}

/// What the fake converter saw for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenCall {
    pub input: PathBuf,
    pub output: PathBuf,
    pub author: Option<String>,
    pub series: Option<String>,
    pub cover: Option<Vec<u8>>,
    pub cover_path: Option<PathBuf>,
    /// Cover files of earlier calls still on disk when this call started.
    pub leftover_covers: usize,
}

/// In-process converter: writes a placeholder e-book, or fails for outputs
/// whose name contains one of `fail_on`.
#[derive(Default)]
pub struct FakeConverter {
    pub missing: bool,
    pub fail_on: Vec<String>,
    pub calls: Mutex<Vec<SeenCall>>,
}

impl FakeConverter {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Converter for FakeConverter {
    fn locate(&self) -> Result<PathBuf, PipelineError> {
        if self.missing {
            Err(PipelineError::ToolNotFound {
                program: "ebook-convert".to_string(),
            })
        } else {
            Ok(PathBuf::from("fake-convert"))
        }
    }

    fn convert(&self, program: &Path, request: &ConvertRequest<'_>) -> Result<(), ConvertError> {
        assert!(request.input.is_file(), "working copy must exist during conversion");
        let mut calls = self.calls.lock().unwrap();
        let leftover_covers = calls
            .iter()
            .filter_map(|call| call.cover_path.as_ref())
            .filter(|path| path.exists())
            .count();
        calls.push(SeenCall {
            input: request.input.to_path_buf(),
            output: request.output.to_path_buf(),
            author: request.author.map(str::to_string),
            series: request.series.map(str::to_string),
            cover: request.cover.map(|p| fs::read(p).unwrap()),
            cover_path: request.cover.map(Path::to_path_buf),
            leftover_covers,
        });
        drop(calls);

        let output_name = request.output.to_string_lossy();
        if self.fail_on.iter().any(|name| output_name.contains(name.as_str())) {
            return Err(ConvertError::ExitStatus {
                program: program.display().to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        fs::write(request.output, b"epub").unwrap();
        Ok(())
    }
}

/// Progress sink keeping every event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn fractions(&self, counter: PhaseCounter) -> Vec<f64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Progress {
                    counter: c,
                    fraction,
                } if *c == counter => Some(*fraction),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
