use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use comic_core::{
    update, AppState, AppViewModel, Msg, ProgressAggregator, SceneId, SmoothingSettings,
};
use comic_engine::{EngineHandle, EngineSettings, PhaseCounter, SessionSummary, DEFAULT_EVENT_CAPACITY};
use engine_logging::{
    debug_requested_by_env, engine_error, engine_info, engine_warn, LogSettings, DEFAULT_LOG_FILE,
};

use super::cli::Cli;
use super::config::{load_config, AppConfig, CONFIG_FILENAME, FRAME_INTERVAL};
use super::effects::EffectRunner;
use super::picker::{Picker, ScriptedPicker};
use super::renderer::{ConsoleRenderer, Renderer};

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let (config, config_error) = match load_config(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    let log_file = (config.log_to_file && !cli.no_log_file).then(|| PathBuf::from(DEFAULT_LOG_FILE));
    engine_logging::initialize(&LogSettings {
        verbose: cli.verbose || debug_requested_by_env(),
        file: log_file,
    });
    if let Some(err) = config_error {
        engine_warn!("{}; using default settings", err);
    }

    let output_dir = match cli.output.clone().or_else(|| config.default_output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let engine = EngineHandle::new(EngineSettings {
        converter_program: cli.converter.clone().or_else(|| config.converter_program.clone()),
        event_capacity: DEFAULT_EVENT_CAPACITY,
    });
    let picker = ScriptedPicker::new(cli.archives.clone(), output_dir);
    let mut app = App::new(
        EffectRunner::new(engine, picker),
        ConsoleRenderer::new(),
        config.smoothing(),
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    // Background tick to throttle rendering, as a windowed shell would.
    let interval = config.tick_interval();
    thread::spawn(move || {
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(interval);
        }
    });

    let outcome = app.drive(&workflow_script(&cli), &msg_rx);
    Ok(exit_code(&outcome))
}

/// How a scripted run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The batch ran; `fatal` is set when it was aborted.
    Completed { fatal: Option<String> },
    /// A navigation guard kept the workflow from reaching `wanted`.
    Blocked { at: SceneId, wanted: SceneId },
    /// The message channel closed before the batch finished.
    Interrupted,
}

/// One user action and the scene it should lead to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub msg: Msg,
    pub expect: Option<SceneId>,
}

impl ScriptStep {
    fn to(msg: Msg, scene: SceneId) -> Self {
        Self {
            msg,
            expect: Some(scene),
        }
    }

    fn edit(msg: Msg) -> Self {
        Self { msg, expect: None }
    }
}

/// The clicks and edits a user makes from Home up to the convert button.
///
/// Without a series the Series step is crossed by an explicit move, so the
/// output files keep their archive names.
pub fn workflow_script(cli: &Cli) -> Vec<ScriptStep> {
    let series = cli
        .series
        .clone()
        .filter(|series| !series.trim().is_empty());
    let series_steps = match series {
        Some(series) => vec![
            ScriptStep::edit(Msg::SeriesChanged(series)),
            ScriptStep::to(Msg::NextClicked, SceneId::Confirm),
        ],
        None => vec![ScriptStep::to(Msg::StepTo(SceneId::Confirm), SceneId::Confirm)],
    };
    vec![
        ScriptStep::to(Msg::PickArchivesClicked, SceneId::ArchivesSelected),
        ScriptStep::to(Msg::PickOutputClicked, SceneId::SourcesReady),
        ScriptStep::to(Msg::NextClicked, SceneId::Metadata),
        ScriptStep::to(Msg::NextClicked, SceneId::Author),
        ScriptStep::edit(Msg::AuthorChanged(cli.author.clone().unwrap_or_default())),
        ScriptStep::to(Msg::NextClicked, SceneId::Series),
    ]
    .into_iter()
    .chain(series_steps)
    .chain([ScriptStep::to(Msg::ConvertClicked, SceneId::Working)])
    .chain(cli.write_report.then_some(ScriptStep::edit(Msg::OpenLogClicked)))
    .collect()
}

fn exit_code(outcome: &DriveOutcome) -> ExitCode {
    match outcome {
        DriveOutcome::Completed { fatal: None } => ExitCode::SUCCESS,
        DriveOutcome::Completed { fatal: Some(reason) } => {
            engine_error!("Conversion aborted: {}", reason);
            ExitCode::FAILURE
        }
        DriveOutcome::Blocked { at, wanted } => {
            engine_error!("Workflow blocked on {} (wanted {})", at, wanted);
            ExitCode::FAILURE
        }
        DriveOutcome::Interrupted => ExitCode::FAILURE,
    }
}

/// Interactive side: owns the state, the renderer and the progress bars.
pub struct App<R: Renderer, P: Picker> {
    state: AppState,
    runner: EffectRunner<P>,
    renderer: R,
    progress: ProgressAggregator,
}

impl<R: Renderer, P: Picker> App<R, P> {
    pub fn new(runner: EffectRunner<P>, mut renderer: R, smoothing: SmoothingSettings) -> Self {
        let mut progress = ProgressAggregator::new(smoothing);
        for counter in PhaseCounter::ALL {
            progress.register_sink(counter.name(), renderer.progress_sink(counter.name()));
        }
        renderer.render_scene(&AppState::new().view());
        Self {
            state: AppState::new(),
            runner,
            renderer,
            progress,
        }
    }

    pub fn scene(&self) -> SceneId {
        self.state.navigation().current()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.runner.last_summary()
    }

    /// Applies `msg` and every message its effects produce.
    pub fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            let view = state.view();
            let was_dirty = state.consume_dirty();
            self.state = state;

            if !was_dirty {
                continue;
            }
            if effects.is_empty() {
                self.renderer.refresh_eligibility(&view);
            }
            inbox.extend(
                self.runner
                    .run(effects, &view, &mut self.renderer, &mut self.progress),
            );
        }
    }

    /// One frame: engine events first, then one animation step.
    pub fn pump(&mut self) {
        for msg in self.runner.poll_engine(&mut self.progress) {
            self.dispatch(msg);
        }
        self.progress.tick();
    }

    /// Plays `script`, then keeps pumping until the batch reaches the End scene.
    pub fn drive(&mut self, script: &[ScriptStep], inbox: &mpsc::Receiver<Msg>) -> DriveOutcome {
        for step in script {
            if step.msg == Msg::OpenLogClicked {
                if let Some(outcome) = self.wait_for_end(inbox) {
                    return outcome;
                }
            }
            self.dispatch(step.msg.clone());
            if let Some(wanted) = step.expect {
                // Judge by what is on screen, not only by the state.
                let shown = self.renderer.current_scene().unwrap_or_default();
                if shown != wanted || self.scene() != wanted {
                    return DriveOutcome::Blocked { at: shown, wanted };
                }
            }
        }
        if let Some(outcome) = self.wait_for_end(inbox) {
            return outcome;
        }
        self.settle_progress();
        engine_info!("Workflow finished on {}", self.scene());
        DriveOutcome::Completed {
            fatal: self
                .state
                .last_batch()
                .and_then(|batch| batch.fatal.clone()),
        }
    }

    /// `Some` only when the inbox closed before the End scene.
    fn wait_for_end(&mut self, inbox: &mpsc::Receiver<Msg>) -> Option<DriveOutcome> {
        while self.scene() != SceneId::End {
            match inbox.recv_timeout(FRAME_INTERVAL) {
                Ok(msg) => self.dispatch(msg),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Some(DriveOutcome::Interrupted),
            }
            self.pump();
        }
        None
    }

    fn settle_progress(&mut self) {
        while self.progress.tick() {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
