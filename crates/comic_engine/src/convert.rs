use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;

use crate::types::PipelineError;

/// Calibre's command line converter.
pub const CONVERTER_PROGRAM: &str = "ebook-convert";

/// One converter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub author: Option<&'a str>,
    pub series: Option<&'a str>,
    pub cover: Option<&'a Path>,
}

impl ConvertRequest<'_> {
    /// `<input> <output> [--authors NAME] [--series NAME] [--cover PATH]`
    pub fn arguments(&self) -> Vec<OsString> {
        let mut args = vec![
            self.input.as_os_str().to_os_string(),
            self.output.as_os_str().to_os_string(),
        ];
        if let Some(author) = self.author {
            args.push("--authors".into());
            args.push(author.into());
        }
        if let Some(series) = self.series {
            args.push("--series".into());
            args.push(series.into());
        }
        if let Some(cover) = self.cover {
            args.push("--cover".into());
            args.push(cover.as_os_str().to_os_string());
        }
        args
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot launch {program}: {message}")]
    Launch { program: String, message: String },
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },
}

pub trait Converter: Send + Sync {
    /// Resolves the executable once per batch.
    fn locate(&self) -> Result<PathBuf, PipelineError>;

    /// Runs one conversion and blocks until it completes.
    fn convert(&self, program: &Path, request: &ConvertRequest<'_>) -> Result<(), ConvertError>;
}

/// Runs `ebook-convert` (or a configured replacement) as a child process.
#[derive(Debug, Clone, Default)]
pub struct EbookConvert {
    program: Option<PathBuf>,
}

impl EbookConvert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `program` instead of searching `PATH` for `ebook-convert`.
    ///
    /// A bare name is still looked up on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn program_name(&self) -> String {
        self.program
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| CONVERTER_PROGRAM.to_string())
    }
}

impl Converter for EbookConvert {
    fn locate(&self) -> Result<PathBuf, PipelineError> {
        let found = match &self.program {
            Some(program) if program.components().count() > 1 => {
                program.is_file().then(|| program.clone())
            }
            Some(program) => find_in_path(&program.to_string_lossy()),
            None => find_in_path(CONVERTER_PROGRAM),
        };
        found.ok_or_else(|| PipelineError::ToolNotFound {
            program: self.program_name(),
        })
    }

    fn convert(&self, program: &Path, request: &ConvertRequest<'_>) -> Result<(), ConvertError> {
        let name = program.display().to_string();
        engine_info!(
            "[CONVERT] {} {} {} ...",
            name,
            request.input.display(),
            request.output.display()
        );
        let output = Command::new(program)
            .args(request.arguments())
            .output()
            .map_err(|err| ConvertError::Launch {
                program: name.clone(),
                message: err.to_string(),
            })?;

        if output.status.success() {
            engine_info!("[CONVERT] wrote {}", request.output.display());
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            engine_debug!("[CONVERT] {}", line);
        }
        engine_warn!(
            "[CONVERT] {} failed with {}",
            request.input.display(),
            output.status
        );
        Err(ConvertError::ExitStatus {
            program: name,
            status: output.status.to_string(),
        })
    }
}

/// Searches `PATH` for `program`, also trying the `.exe` variant.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    let candidates = [program.to_string(), format!("{program}.exe")];
    env::split_paths(&path)
        .flat_map(|dir| candidates.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}
