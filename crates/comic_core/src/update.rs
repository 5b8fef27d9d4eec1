use crate::{AppState, Effect, Msg, Notice, NoticeKind, SceneId, Trigger};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PickArchivesClicked => {
            let nav = state.navigation();
            if nav.can_advance(nav.archive_pick_target(), Trigger::Explicit) {
                vec![Effect::OpenArchivePicker]
            } else {
                Vec::new()
            }
        }
        Msg::PickOutputClicked => {
            let nav = state.navigation();
            if nav.can_advance(nav.output_pick_target(), Trigger::Explicit) {
                vec![Effect::OpenDirectoryPicker]
            } else {
                Vec::new()
            }
        }
        Msg::ArchivesPicked(files) => {
            // An empty selection is a dismissed picker.
            if files.is_empty() {
                return (state, Vec::new());
            }
            let target = state.navigation().archive_pick_target();
            if !state.navigation().can_advance(target, Trigger::Explicit) {
                return (state, Vec::new());
            }
            let nav = state.navigation_mut();
            let mut effects = nav.set_input_files(files);
            effects.extend(nav.advance(Trigger::Explicit, target));
            state.mark_archives_chosen();
            effects
        }
        Msg::OutputDirPicked(dir) => {
            let target = state.navigation().output_pick_target();
            if !state.navigation().can_advance(target, Trigger::Explicit) {
                return (state, Vec::new());
            }
            let nav = state.navigation_mut();
            let mut effects = nav.set_output_dir(Some(dir));
            effects.extend(nav.advance(Trigger::Explicit, target));
            state.mark_output_chosen();
            effects
        }
        Msg::PickerCancelled => Vec::new(),
        Msg::NextClicked => state.navigation_mut().advance(Trigger::Next, None),
        Msg::StepTo(target) => state
            .navigation_mut()
            .advance(Trigger::Explicit, Some(target)),
        Msg::ResetClicked => {
            let effects = state.navigation_mut().advance(Trigger::Reset, None);
            state.clear_choice_marks();
            effects
        }
        Msg::ConvertClicked => {
            if state.navigation().current() == SceneId::Confirm {
                state
                    .navigation_mut()
                    .advance(Trigger::Explicit, Some(SceneId::Working))
            } else {
                Vec::new()
            }
        }
        Msg::OpenLogClicked => {
            if state.navigation().current() == SceneId::End && state.last_batch().is_some() {
                vec![Effect::WriteReport]
            } else {
                Vec::new()
            }
        }
        Msg::AuthorChanged(author) => state.navigation_mut().set_author(&author),
        Msg::SeriesChanged(series) => state.navigation_mut().set_series(&series),
        Msg::PipelineFinished(result) => {
            let mut effects = state.navigation_mut().on_pipeline_finished();
            if let Some(reason) = &result.fatal {
                let notice = Notice::new(NoticeKind::Fatal, "Conversion failed", reason.clone());
                state.set_notice(Some(notice.clone()));
                effects.push(Effect::ShowNotice(notice));
            }
            state.set_last_batch(result);
            effects
        }
        Msg::ReportWritten(path) => {
            let notice = Notice::new(
                NoticeKind::Info,
                "Log généré",
                format!("Le fichier log a été enregistré:\n{}", path.display()),
            );
            state.set_notice(Some(notice.clone()));
            vec![Effect::ShowNotice(notice)]
        }
        Msg::ReportWriteFailed(reason) => {
            let notice = Notice::new(
                NoticeKind::Warning,
                "Échec",
                format!("Impossible de générer le log : {reason}"),
            );
            state.set_notice(Some(notice.clone()));
            vec![Effect::ShowNotice(notice)]
        }
        Msg::NoticeDismissed => {
            state.set_notice(None);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    if !effects.is_empty() {
        state.mark_dirty();
    }
    (state, effects)
}
