//! Comic engine: archive repair, conversion pipeline and the worker thread.
mod convert;
mod cover;
mod engine;
mod filename;
mod persist;
mod pipeline;
mod repair;
mod report;
mod types;

pub use convert::{find_in_path, ConvertError, ConvertRequest, Converter, EbookConvert, CONVERTER_PROGRAM};
pub use cover::{extract_cover, is_image, select_cover, CoverError, IMAGE_EXTENSIONS};
pub use engine::{EngineHandle, EngineSettings, DEFAULT_EVENT_CAPACITY};
pub use filename::{output_file_name, sanitize_filename, OUTPUT_EXTENSION};
pub use persist::{ensure_output_dir, replace_text_file, PersistError};
pub use pipeline::{run_pipeline, run_pipeline_in, ChannelProgressSink, PipelineOutcome, ProgressSink};
pub use repair::{repair_archive, RepairError, RepairOutcome};
pub use report::{
    format_duration, ReportError, SessionReport, SessionSummary, APP_VERSION, REPORT_FILE_NAME,
    TOOL_NAME,
};
pub use types::{
    ConversionJob, ConvertStatus, EngineEvent, FileOutcome, PhaseCounter, PipelineError,
    RepairStatus,
};
