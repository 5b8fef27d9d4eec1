use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User clicked the archive chooser.
    PickArchivesClicked,
    /// User clicked the output folder chooser.
    PickOutputClicked,
    /// Archive picker returned a selection.
    ArchivesPicked(Vec<PathBuf>),
    /// Folder picker returned a selection.
    OutputDirPicked(PathBuf),
    /// A picker was dismissed without a selection.
    PickerCancelled,
    /// Next button or Enter key.
    NextClicked,
    ResetClicked,
    /// A control that names its destination; honoured only one canonical step ahead.
    StepTo(crate::SceneId),
    /// Convert button on the confirmation step.
    ConvertClicked,
    /// Log button on the final step.
    OpenLogClicked,
    /// Author text field edited.
    AuthorChanged(String),
    /// Series text field edited.
    SeriesChanged(String),
    /// Worker finished the batch (or aborted it).
    PipelineFinished(crate::BatchResult),
    /// Session report written to disk.
    ReportWritten(PathBuf),
    /// Session report could not be written.
    ReportWriteFailed(String),
    NoticeDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
