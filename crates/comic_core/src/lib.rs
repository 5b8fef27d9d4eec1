//! Comic core: pure navigation state machine, progress smoothing and view-model helpers.
mod effect;
mod msg;
mod navigation;
mod progress;
mod scene;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use navigation::{
    ConversionRequest, NavigationController, NavigationState, PipelinePhase, Trigger,
};
pub use progress::{
    ProgressAggregator, ProgressCounter, ProgressSinkFn, SmoothingSettings,
};
pub use scene::SceneId;
pub use state::{shorten_path, AppState, BatchResult, Notice, NoticeKind};
pub use update::update;
pub use view_model::{AppViewModel, Eligibility};
