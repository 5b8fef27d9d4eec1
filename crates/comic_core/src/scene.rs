use std::fmt;

/// Workflow steps, declared in canonical order.
///
/// The discriminant order is the canonical order: `Home` first, `End` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SceneId {
    /// Start screen; the user picks archives or the output folder.
    #[default]
    Home,
    /// Branch A: archives chosen, output folder still missing.
    ArchivesSelected,
    /// Branch B: output folder chosen, archives still missing.
    OutputSelected,
    /// Convergence: both archives and output folder chosen.
    SourcesReady,
    Metadata,
    Author,
    Series,
    Confirm,
    /// Run step: the conversion pipeline is working.
    Working,
    End,
}

impl SceneId {
    pub const CANONICAL_ORDER: [SceneId; 10] = [
        SceneId::Home,
        SceneId::ArchivesSelected,
        SceneId::OutputSelected,
        SceneId::SourcesReady,
        SceneId::Metadata,
        SceneId::Author,
        SceneId::Series,
        SceneId::Confirm,
        SceneId::Working,
        SceneId::End,
    ];

    pub fn position(self) -> usize {
        self as usize
    }

    /// Next step in canonical order, `None` on the last step.
    pub fn next(self) -> Option<SceneId> {
        Self::CANONICAL_ORDER.get(self.position() + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn is_branch(self) -> bool {
        matches!(self, SceneId::ArchivesSelected | SceneId::OutputSelected)
    }

    pub fn label(self) -> &'static str {
        match self {
            SceneId::Home => "01_home",
            SceneId::ArchivesSelected => "02_archives_ok",
            SceneId::OutputSelected => "02_output_ok",
            SceneId::SourcesReady => "03_sources_ok",
            SceneId::Metadata => "04_metadata",
            SceneId::Author => "05_author",
            SceneId::Series => "06_series",
            SceneId::Confirm => "07_start_conversion",
            SceneId::Working => "08_working",
            SceneId::End => "09_end",
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
