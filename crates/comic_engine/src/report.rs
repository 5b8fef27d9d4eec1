//! Session summary and the `log.txt` report rendered from it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeDelta};
use thiserror::Error;

use crate::persist::{ensure_output_dir, replace_text_file, PersistError};
use crate::types::{display_name, ConversionJob, ConvertStatus, FileOutcome, RepairStatus};

pub const REPORT_FILE_NAME: &str = "log.txt";
pub const TOOL_NAME: &str = "Calibre (ebook-convert)";
pub const APP_VERSION: &str = "v1.0.0";

const RULE_WIDTH: usize = 46;
const DATE_FORMAT: &str = "%Y-%m-%d  %H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no output directory to write the report into")]
    NoOutputDir,
    #[error("cannot write report: {0}")]
    Write(#[from] PersistError),
}

/// Aggregate record of one batch, filled by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Display names of the discovered archives, in batch order.
    pub found_files: Vec<String>,
    /// One entry per input file, same order as `found_files`.
    pub outcomes: Vec<FileOutcome>,
    pub author: Option<String>,
    pub series: Option<String>,
    pub tool: String,
    pub version: String,
    pub user: String,
}

impl SessionSummary {
    pub fn start(job: &ConversionJob) -> Self {
        Self {
            start_time: Local::now(),
            end_time: None,
            input_dir: job.input_dir(),
            output_dir: job.resolved_output_dir(),
            found_files: job.input_files.iter().map(|p| display_name(p)).collect(),
            outcomes: Vec::with_capacity(job.input_files.len()),
            author: job.author().map(str::to_string),
            series: job.series().map(str::to_string),
            tool: TOOL_NAME.to_string(),
            version: APP_VERSION.to_string(),
            user: current_user(),
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Local::now());
    }

    pub fn duration(&self) -> TimeDelta {
        match self.end_time {
            Some(end) => (end - self.start_time).max(TimeDelta::zero()),
            None => TimeDelta::zero(),
        }
    }

    pub fn processed(&self) -> usize {
        self.found_files.len()
    }

    pub fn repair_count(&self, status: RepairStatus) -> usize {
        self.outcomes.iter().filter(|o| o.repair == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.convert, ConvertStatus::Success(_)))
            .count()
    }

    /// Failed plus skipped conversions.
    pub fn failed(&self) -> usize {
        self.processed().saturating_sub(self.succeeded())
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Renders a [`SessionSummary`] as the French session log.
pub struct SessionReport<'a> {
    summary: &'a SessionSummary,
}

impl<'a> SessionReport<'a> {
    pub fn new(summary: &'a SessionSummary) -> Self {
        Self { summary }
    }

    pub fn render(&self) -> String {
        let s = self.summary;
        let rule = "─".repeat(RULE_WIDTH);
        let mut out = String::new();

        let mut line = |text: &str| {
            out.push_str(text);
            out.push('\n');
        };
        let section = |line: &mut dyn FnMut(&str), title: &str| {
            line(&rule);
            line(title);
            line(&rule);
        };

        section(&mut line, "CBZ → EPUB CONVERTER — SESSION LOG");
        line(&format!("Date : {}", s.start_time.format(DATE_FORMAT)));
        line(&format!("Utilisateur : {}", s.user));
        line(&format!("Version de l'application : {}", s.version));
        line(&rule);
        line("");
        line("🗂️ Dossier d’entrée :");
        line(&path_text(s.input_dir.as_deref()));
        line("");
        line("📁 Dossier de sortie :");
        line(&path_text(Some(&s.output_dir)));
        line("");

        section(&mut line, "📋 LISTE DES FICHIERS TROUVÉS");
        for (i, name) in s.found_files.iter().enumerate() {
            line(&format!("{}. {}", i + 1, name));
        }
        line(&format!("→ Total : {} fichiers détectés", s.processed()));
        line("");

        section(&mut line, "🧩 ÉTAPE 1 — VÉRIFICATION ET RÉPARATION");
        for outcome in &s.outcomes {
            line(&repair_line(outcome));
        }
        line("");
        line(&format!(
            "→ {} fichier(s) réparé(s), {} fichier(s) illisible(s), {} intact(s)",
            s.repair_count(RepairStatus::Fixed),
            s.repair_count(RepairStatus::Unreadable),
            s.repair_count(RepairStatus::Intact)
        ));
        line("");

        section(&mut line, "⚙️ ÉTAPE 2 — CONVERSION CBZ → EPUB");
        for outcome in &s.outcomes {
            line(&convert_line(outcome));
        }
        line("");
        line(&format!(
            "→ {} conversions réussies / {} fichiers traités",
            s.succeeded(),
            s.processed()
        ));
        line("");

        section(&mut line, "🧾 SYNTHÈSE GLOBALE");
        line(&format!("📦 Fichiers trouvés : {}", s.processed()));
        line(&format!(
            "🛠️ Fichiers réparés : {}",
            s.repair_count(RepairStatus::Fixed)
        ));
        line(&format!("✅ Conversions réussies : {}", s.succeeded()));
        line(&format!("⚠️ Conversions échouées : {}", s.failed()));
        line(&format!("⏱️ Durée totale : {}", format_duration(s.duration())));
        line("");

        section(&mut line, "💬 DÉTAILS SUPPLÉMENTAIRES");
        if let Some(series) = &s.series {
            line(&format!("- Nom de la série : {series}"));
        }
        if let Some(author) = &s.author {
            line(&format!("- Auteur : {author}"));
        }
        line(&format!("- Logiciel de conversion : {}", s.tool));
        line("- Format de sortie : EPUB v2");
        line(&rule);
        line("");
        line("Fin du rapport — CBZ→EPUB Converter");
        line(&rule);
        out
    }

    /// Writes the rendered report as `log.txt` inside `dir`.
    pub fn write_to_file(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        if dir.as_os_str().is_empty() {
            return Err(ReportError::NoOutputDir);
        }
        ensure_output_dir(dir)?;
        let target = dir.join(REPORT_FILE_NAME);
        replace_text_file(&target, &self.render())?;
        Ok(target)
    }
}

fn path_text(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

fn repair_line(outcome: &FileOutcome) -> String {
    let name = &outcome.name;
    match outcome.repair {
        RepairStatus::Intact => format!("[OK] {name} — archive valide"),
        RepairStatus::Fixed => format!("[FIXED] {name} — corruption réparée"),
        RepairStatus::Unreadable => format!("[ERROR] {name} — fichier illisible (zlib error)"),
    }
}

fn convert_line(outcome: &FileOutcome) -> String {
    let name = &outcome.name;
    match &outcome.convert {
        ConvertStatus::Success(path) => format!("[OK] {name} → {}", display_name(path)),
        ConvertStatus::Skipped => format!("[SKIPPED] {name} → fichier ignoré (non réparable)"),
        ConvertStatus::Failed => format!("[ERROR] {name} → échec de la conversion"),
    }
}

/// `HH:MM:SS`, hours not wrapped at 24.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
