use std::path::{Component, Path};

use crate::view_model::{AppViewModel, Eligibility};
use crate::{NavigationController, SceneId, Trigger};

/// Outcome counts of one batch, as seen by the interactive side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Set when the batch was aborted before converting anything.
    pub fatal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Fatal,
}

/// A dismissible message shown on top of the current scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    nav: NavigationController,
    archives_chosen: bool,
    output_chosen: bool,
    last_batch: Option<BatchResult>,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub(crate) fn navigation_mut(&mut self) -> &mut NavigationController {
        &mut self.nav
    }

    pub fn last_batch(&self) -> Option<&BatchResult> {
        self.last_batch.as_ref()
    }

    pub(crate) fn set_last_batch(&mut self, result: BatchResult) {
        self.last_batch = Some(result);
    }

    pub(crate) fn mark_archives_chosen(&mut self) {
        self.archives_chosen = true;
    }

    pub(crate) fn mark_output_chosen(&mut self) {
        self.output_chosen = true;
    }

    pub(crate) fn clear_choice_marks(&mut self) {
        self.archives_chosen = false;
        self.output_chosen = false;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }

    pub fn view(&self) -> AppViewModel {
        let nav = self.nav.state();
        let scene = nav.scene();
        AppViewModel {
            scene,
            eligibility: self.eligibility(),
            input_count: nav.input_files().len(),
            output_dir: nav.output_dir().map(Path::to_path_buf),
            output_hint: nav.output_dir().map(shorten_path).unwrap_or_default(),
            author: nav.author().map(ToOwned::to_owned),
            series: nav.series().map(ToOwned::to_owned),
            pipeline_running: self.nav.pipeline_running(),
            last_batch: self.last_batch.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    fn eligibility(&self) -> Eligibility {
        let nav = &self.nav;
        let scene = nav.current();
        Eligibility {
            next: nav.can_advance(scene.next(), Trigger::Next),
            reset: nav.can_advance(Some(SceneId::Home), Trigger::Reset),
            pick_archives: !self.archives_chosen
                && nav.can_advance(nav.archive_pick_target(), Trigger::Explicit),
            pick_output: !self.output_chosen
                && nav.can_advance(nav.output_pick_target(), Trigger::Explicit),
            convert: scene == SceneId::Confirm
                && nav.can_advance(Some(SceneId::Working), Trigger::Explicit),
            open_log: scene == SceneId::End && self.last_batch.is_some(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Last two path segments prefixed with `/`, as shown on the final scene.
pub fn shorten_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match parts.as_slice() {
        [] => String::new(),
        [only] => format!("/{only}"),
        [.., parent, leaf] => format!("/{parent}/{leaf}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_path_keeps_last_two_segments() {
        assert_eq!(shorten_path(Path::new("/home/jane/comics/out")), "/comics/out");
        assert_eq!(shorten_path(Path::new("out")), "/out");
        assert_eq!(shorten_path(Path::new("/")), "");
    }
}
