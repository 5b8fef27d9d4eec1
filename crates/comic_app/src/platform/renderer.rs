use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use comic_core::{AppViewModel, Eligibility, Notice, NoticeKind, ProgressSinkFn, SceneId};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

/// Text of the final scene; placeholders are filled from the view.
pub const END_TEMPLATE: &str = "{n} fichier(s) traité(s). Les EPUB sont dans {output path}";

/// Receives render commands from the effect runner.
pub trait Renderer {
    fn render_scene(&mut self, view: &AppViewModel);
    /// Updates control availability without changing scene.
    fn refresh_eligibility(&mut self, view: &AppViewModel);
    fn current_scene(&self) -> Option<SceneId>;
    fn show_notice(&mut self, notice: &Notice);
    /// Sink receiving the displayed fraction of one progress counter.
    fn progress_sink(&self, counter: &str) -> ProgressSinkFn;
}

/// Logs scenes, availability, progress and notices to the terminal log.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    scene: Option<SceneId>,
    history: Vec<SceneId>,
    notices: Vec<Notice>,
    eligibility: Eligibility,
    progress: Rc<RefCell<BTreeMap<String, f64>>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every scene rendered so far, in order.
    pub fn history(&self) -> &[SceneId] {
        &self.history
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    /// Last fraction displayed for `counter`.
    pub fn progress(&self, counter: &str) -> f64 {
        self.progress.borrow().get(counter).copied().unwrap_or(0.0)
    }
}

impl Renderer for ConsoleRenderer {
    fn render_scene(&mut self, view: &AppViewModel) {
        if self.scene != Some(view.scene) {
            self.history.push(view.scene);
        }
        self.scene = Some(view.scene);
        self.eligibility = view.eligibility;

        match view.scene {
            SceneId::End => engine_info!("[SCENE] {}: {}", view.scene, end_text(END_TEMPLATE, view)),
            SceneId::Working => engine_info!("[SCENE] {}: converting {} file(s)", view.scene, view.input_count),
            scene => engine_info!("[SCENE] {}", scene),
        }
    }

    fn refresh_eligibility(&mut self, view: &AppViewModel) {
        self.eligibility = view.eligibility;
        engine_debug!("[SCENE] availability {:?}", view.eligibility);
    }

    fn current_scene(&self) -> Option<SceneId> {
        self.scene
    }

    fn show_notice(&mut self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Info => engine_info!("[NOTICE] {}: {}", notice.title, notice.message),
            NoticeKind::Warning => engine_warn!("[NOTICE] {}: {}", notice.title, notice.message),
            NoticeKind::Fatal => engine_error!("[NOTICE] {}: {}", notice.title, notice.message),
        }
        self.notices.push(notice.clone());
    }

    fn progress_sink(&self, counter: &str) -> ProgressSinkFn {
        let shared = Rc::clone(&self.progress);
        let name = counter.to_string();
        Box::new(move |fraction| {
            let previous = shared.borrow_mut().insert(name.clone(), fraction).unwrap_or(0.0);
            // One line per 10 % crossed keeps the log readable.
            if (fraction * 10.0).floor() > (previous * 10.0).floor() || fraction == 0.0 {
                engine_info!("[PROG] {} {:>3.0}%", name, fraction * 100.0);
            }
        })
    }
}

/// Fills `{n}` and `{output path}` in the final scene's text.
pub fn end_text(template: &str, view: &AppViewModel) -> String {
    let count = view
        .last_batch
        .as_ref()
        .map_or(view.input_count, |batch| batch.processed);
    template
        .replace("{n}", &count.to_string())
        .replace("{output path}", &view.output_hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use comic_core::BatchResult;

    #[test]
    fn end_text_uses_processed_count_and_short_path() {
        let view = AppViewModel {
            scene: SceneId::End,
            input_count: 5,
            output_hint: "/comics/epub".to_string(),
            last_batch: Some(BatchResult {
                processed: 4,
                succeeded: 4,
                failed: 0,
                fatal: None,
            }),
            ..AppViewModel::default()
        };
        assert_eq!(
            end_text(END_TEMPLATE, &view),
            "4 fichier(s) traité(s). Les EPUB sont dans /comics/epub"
        );
    }

    #[test]
    fn progress_sinks_share_the_renderer_state() {
        let renderer = ConsoleRenderer::new();
        let mut sink = renderer.progress_sink("repaired");
        sink(0.25);
        sink(0.5);
        assert_eq!(renderer.progress("repaired"), 0.5);
        assert_eq!(renderer.progress("converted"), 0.0);
    }

    #[test]
    fn history_skips_re_renders_of_the_same_scene() {
        let mut renderer = ConsoleRenderer::new();
        let home = AppViewModel::default();
        renderer.render_scene(&home);
        renderer.render_scene(&home);
        assert_eq!(renderer.history(), [SceneId::Home]);
        assert_eq!(renderer.current_scene(), Some(SceneId::Home));
    }
}
