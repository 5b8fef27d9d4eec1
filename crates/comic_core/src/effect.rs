use crate::{ConversionRequest, Notice, SceneId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a new scene.
    RenderScene(SceneId),
    /// Re-evaluate button availability without changing scene.
    RefreshEligibility,
    OpenArchivePicker,
    OpenDirectoryPicker,
    /// Launch the worker for a snapshot of the current selections.
    StartConversion(ConversionRequest),
    /// Snap every progress counter back to zero.
    ResetProgress,
    /// Write the session report of the last batch into the output folder.
    WriteReport,
    ShowNotice(Notice),
}
