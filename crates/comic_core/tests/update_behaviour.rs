use std::path::PathBuf;
use std::sync::Once;

use comic_core::{
    update, AppState, BatchResult, ConversionRequest, Effect, Msg, NoticeKind, SceneId,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn send(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    let mut state = state;
    let mut last = Vec::new();
    for msg in msgs {
        let (next, effects) = update(state, msg);
        state = next;
        last = effects;
    }
    (state, last)
}

fn archives() -> Vec<PathBuf> {
    vec![PathBuf::from("/comics/a.cbz"), PathBuf::from("/comics/b.cbz")]
}

/// Walks the happy path up to the confirmation step.
fn at_confirm() -> AppState {
    let (state, _) = send(
        AppState::new(),
        vec![
            Msg::PickArchivesClicked,
            Msg::ArchivesPicked(archives()),
            Msg::PickOutputClicked,
            Msg::OutputDirPicked(PathBuf::from("/books/out")),
            Msg::NextClicked,
            Msg::NextClicked,
            Msg::AuthorChanged("Jane Doe".to_string()),
            Msg::NextClicked,
            Msg::SeriesChanged("My Series".to_string()),
            Msg::NextClicked,
        ],
    );
    assert_eq!(state.view().scene, SceneId::Confirm);
    state
}

#[test]
fn blank_series_step_is_crossed_by_an_explicit_move() {
    init_logging();
    let (state, _) = send(
        AppState::new(),
        vec![
            Msg::ArchivesPicked(archives()),
            Msg::OutputDirPicked(PathBuf::from("/out")),
            Msg::NextClicked,
            Msg::NextClicked,
            Msg::AuthorChanged("Jane Doe".to_string()),
            Msg::NextClicked,
        ],
    );
    assert_eq!(state.view().scene, SceneId::Series);

    let (state, effects) = update(state, Msg::NextClicked);
    assert_eq!(state.view().scene, SceneId::Series);
    assert!(effects.is_empty());

    // Two steps ahead is refused even as an explicit move.
    let (state, effects) = update(state, Msg::StepTo(SceneId::Working));
    assert_eq!(state.view().scene, SceneId::Series);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::StepTo(SceneId::Confirm));
    assert_eq!(state.view().scene, SceneId::Confirm);
    assert_eq!(effects, vec![Effect::RenderScene(SceneId::Confirm)]);
}

#[test]
fn archive_button_on_home_opens_picker() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::PickArchivesClicked);
    assert_eq!(effects, vec![Effect::OpenArchivePicker]);
}

#[test]
fn cancelled_picker_changes_nothing() {
    init_logging();
    let state = AppState::new();
    let before = state.view();

    let (next, effects) = update(state.clone(), Msg::PickerCancelled);
    assert_eq!(next.view(), before);
    assert!(effects.is_empty());

    let (next, effects) = update(state, Msg::ArchivesPicked(Vec::new()));
    assert_eq!(next.view(), before);
    assert!(effects.is_empty());
}

#[test]
fn picking_archives_then_output_converges() {
    init_logging();
    let (state, effects) = send(AppState::new(), vec![Msg::ArchivesPicked(archives())]);
    assert_eq!(state.view().scene, SceneId::ArchivesSelected);
    assert_eq!(
        effects,
        vec![
            Effect::RefreshEligibility,
            Effect::RenderScene(SceneId::ArchivesSelected)
        ]
    );
    let view = state.view();
    assert_eq!(view.input_count, 2);
    assert!(!view.eligibility.pick_archives);
    assert!(view.eligibility.pick_output);

    let (state, _) = send(state, vec![Msg::OutputDirPicked(PathBuf::from("/books/out"))]);
    assert_eq!(state.view().scene, SceneId::SourcesReady);
    assert_eq!(state.view().output_hint, "/books/out");
}

#[test]
fn picking_output_first_takes_the_other_branch() {
    init_logging();
    let (state, _) = send(
        AppState::new(),
        vec![Msg::OutputDirPicked(PathBuf::from("/books/out"))],
    );
    assert_eq!(state.view().scene, SceneId::OutputSelected);

    let (state, _) = send(state, vec![Msg::ArchivesPicked(archives())]);
    assert_eq!(state.view().scene, SceneId::SourcesReady);
}

#[test]
fn author_field_gates_next_and_refreshes_eligibility() {
    init_logging();
    let (state, _) = send(
        AppState::new(),
        vec![
            Msg::ArchivesPicked(archives()),
            Msg::OutputDirPicked(PathBuf::from("/out")),
            Msg::NextClicked,
            Msg::NextClicked,
        ],
    );
    assert_eq!(state.view().scene, SceneId::Author);
    assert!(!state.view().eligibility.next);

    let (state, effects) = update(state, Msg::NextClicked);
    assert_eq!(state.view().scene, SceneId::Author);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::AuthorChanged("  ".to_string()));
    assert_eq!(effects, vec![Effect::RefreshEligibility]);
    assert!(!state.view().eligibility.next);

    let (state, _) = update(state, Msg::AuthorChanged("Jane Doe".to_string()));
    assert!(state.view().eligibility.next);
    let (state, _) = update(state, Msg::NextClicked);
    assert_eq!(state.view().scene, SceneId::Series);
}

#[test]
fn convert_launches_the_pipeline_once() {
    init_logging();
    let state = at_confirm();
    assert!(state.view().eligibility.convert);

    let (state, effects) = update(state, Msg::ConvertClicked);
    assert_eq!(state.view().scene, SceneId::Working);
    assert!(state.view().pipeline_running);
    assert_eq!(
        effects,
        vec![
            Effect::RenderScene(SceneId::Working),
            Effect::ResetProgress,
            Effect::StartConversion(ConversionRequest {
                input_files: archives(),
                output_dir: Some(PathBuf::from("/books/out")),
                author: Some("Jane Doe".to_string()),
                series: Some("My Series".to_string()),
            }),
        ]
    );

    // Next leaves the run step; the batch keeps running.
    let (state, effects) = update(state, Msg::NextClicked);
    assert_eq!(state.view().scene, SceneId::End);
    assert_eq!(effects, vec![Effect::RenderScene(SceneId::End)]);
    assert!(state.view().pipeline_running);

    // Returning to the run step while the batch is active starts nothing new.
    let (state, _) = send(
        state,
        vec![
            Msg::ResetClicked,
            Msg::ArchivesPicked(archives()),
            Msg::OutputDirPicked(PathBuf::from("/books/out")),
            Msg::NextClicked,
            Msg::NextClicked,
            Msg::NextClicked,
            Msg::NextClicked,
        ],
    );
    assert_eq!(state.view().scene, SceneId::Confirm);
    let (state, effects) = update(state, Msg::ConvertClicked);
    assert_eq!(state.view().scene, SceneId::Working);
    assert_eq!(effects, vec![Effect::RenderScene(SceneId::Working)]);
}

#[test]
fn convert_is_ignored_outside_confirmation() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ConvertClicked);
    assert_eq!(state.view().scene, SceneId::Home);
    assert!(effects.is_empty());
}

#[test]
fn pipeline_finished_moves_to_end_and_enables_log() {
    init_logging();
    let (state, _) = update(at_confirm(), Msg::ConvertClicked);
    let result = BatchResult {
        processed: 2,
        succeeded: 2,
        failed: 0,
        fatal: None,
    };

    let (mut state, effects) = update(state, Msg::PipelineFinished(result.clone()));
    assert_eq!(effects, vec![Effect::RenderScene(SceneId::End)]);
    let view = state.view();
    assert_eq!(view.scene, SceneId::End);
    assert!(!view.pipeline_running);
    assert!(view.eligibility.open_log);
    assert_eq!(view.last_batch, Some(result));
    assert!(state.consume_dirty());

    let (_state, effects) = update(state, Msg::OpenLogClicked);
    assert_eq!(effects, vec![Effect::WriteReport]);
}

#[test]
fn fatal_finish_still_reaches_end_with_notice() {
    init_logging();
    let (state, _) = update(at_confirm(), Msg::ConvertClicked);
    let (state, effects) = update(
        state,
        Msg::PipelineFinished(BatchResult {
            processed: 2,
            succeeded: 0,
            failed: 2,
            fatal: Some("ebook-convert not found".to_string()),
        }),
    );

    assert_eq!(state.view().scene, SceneId::End);
    assert_eq!(effects.len(), 2);
    let notice = state.view().notice.expect("fatal notice");
    assert_eq!(notice.kind, NoticeKind::Fatal);

    let (state, _) = update(state, Msg::NoticeDismissed);
    assert!(state.view().notice.is_none());
}

#[test]
fn log_button_is_inert_before_the_end() {
    init_logging();
    let (_state, effects) = update(at_confirm(), Msg::OpenLogClicked);
    assert!(effects.is_empty());
}

#[test]
fn report_failure_becomes_a_warning_notice() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ReportWriteFailed("permission denied".to_string()),
    );
    assert_eq!(effects.len(), 1);
    let notice = state.view().notice.expect("notice");
    assert_eq!(notice.kind, NoticeKind::Warning);
    assert!(notice.message.contains("permission denied"));
}

#[test]
fn reset_returns_home_from_anywhere() {
    init_logging();
    let (state, effects) = update(at_confirm(), Msg::ResetClicked);
    assert_eq!(state.view().scene, SceneId::Home);
    assert_eq!(effects, vec![Effect::RenderScene(SceneId::Home)]);
    assert!(state.view().eligibility.pick_archives);

    let (state, effects) = update(state, Msg::NextClicked);
    assert_eq!(state.view().scene, SceneId::Home);
    assert!(effects.is_empty());
}
