use std::path::{Path, PathBuf};

use crate::{Effect, SceneId};

/// What asked for a scene change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Generic "next" (button or Enter key).
    Next,
    /// Return to Home from anywhere.
    Reset,
    /// A button bound to a specific target scene.
    Explicit,
}

/// User selections plus the current scene.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    scene: SceneId,
    input_files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    author: Option<String>,
    series: Option<String>,
}

impl NavigationState {
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn input_files(&self) -> &[PathBuf] {
        &self.input_files
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    pub fn snapshot(&self) -> ConversionRequest {
        ConversionRequest {
            input_files: self.input_files.clone(),
            output_dir: self.output_dir.clone(),
            author: self.author.clone(),
            series: self.series.clone(),
        }
    }
}

/// Immutable copy of the selections taken when a batch starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversionRequest {
    pub input_files: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub author: Option<String>,
    pub series: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Canonical-order state machine gating every scene transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationController {
    state: NavigationState,
    pipeline: PipelinePhase,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current(&self) -> SceneId {
        self.state.scene
    }

    pub fn pipeline_phase(&self) -> PipelinePhase {
        self.pipeline
    }

    pub fn pipeline_running(&self) -> bool {
        self.pipeline == PipelinePhase::Running
    }

    /// Whether `trigger` may move the current scene to `target`.
    pub fn can_advance(&self, target: Option<SceneId>, trigger: Trigger) -> bool {
        self.can_advance_from(self.state.scene, target, trigger)
    }

    /// Transition rules, evaluated in priority order.
    pub fn can_advance_from(
        &self,
        current: SceneId,
        target: Option<SceneId>,
        trigger: Trigger,
    ) -> bool {
        if trigger == Trigger::Reset {
            return true;
        }
        let Some(target) = target else {
            return false;
        };

        if trigger != Trigger::Next {
            if current == SceneId::Home && target.is_branch() {
                return true;
            }
            if current.is_branch() && target == SceneId::SourcesReady {
                return true;
            }
        }

        if trigger == Trigger::Next {
            return current != SceneId::Home && !current.is_last() && self.guard_satisfied(current);
        }

        current.next() == Some(target)
    }

    /// Field guard of a step; steps without a guard always pass.
    fn guard_satisfied(&self, scene: SceneId) -> bool {
        match scene {
            SceneId::Author => has_text(self.state.author.as_deref()),
            SceneId::Series => has_text(self.state.series.as_deref()),
            _ => true,
        }
    }

    /// Target a trigger would move to from the current scene.
    pub fn resolve_target(&self, trigger: Trigger, explicit: Option<SceneId>) -> Option<SceneId> {
        match trigger {
            Trigger::Reset => Some(SceneId::Home),
            Trigger::Next => self.state.scene.next(),
            Trigger::Explicit => explicit,
        }
    }

    /// Move to the resolved target when allowed; a refused move yields no effect.
    pub fn advance(&mut self, trigger: Trigger, explicit: Option<SceneId>) -> Vec<Effect> {
        let target = self.resolve_target(trigger, explicit);
        if !self.can_advance(target, trigger) {
            return Vec::new();
        }
        match target {
            Some(target) => self.enter(target),
            None => Vec::new(),
        }
    }

    fn enter(&mut self, target: SceneId) -> Vec<Effect> {
        self.state.scene = target;
        let mut effects = vec![Effect::RenderScene(target)];
        if target == SceneId::Working && !self.pipeline_running() {
            self.pipeline = PipelinePhase::Running;
            effects.push(Effect::ResetProgress);
            effects.push(Effect::StartConversion(self.state.snapshot()));
        }
        effects
    }

    /// Pipeline completion always unlocks the terminal step.
    pub fn on_pipeline_finished(&mut self) -> Vec<Effect> {
        self.pipeline = PipelinePhase::Finished;
        if self.state.scene == SceneId::End {
            return vec![Effect::RefreshEligibility];
        }
        self.state.scene = SceneId::End;
        vec![Effect::RenderScene(SceneId::End)]
    }

    pub fn set_author(&mut self, value: &str) -> Vec<Effect> {
        self.state.author = non_empty(value);
        vec![Effect::RefreshEligibility]
    }

    pub fn set_series(&mut self, value: &str) -> Vec<Effect> {
        self.state.series = non_empty(value);
        vec![Effect::RefreshEligibility]
    }

    /// Stores the archives in the given order, dropping repeated paths.
    pub fn set_input_files(&mut self, files: Vec<PathBuf>) -> Vec<Effect> {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(files.len());
        for file in files {
            if !unique.contains(&file) {
                unique.push(file);
            }
        }
        self.state.input_files = unique;
        vec![Effect::RefreshEligibility]
    }

    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) -> Vec<Effect> {
        self.state.output_dir = dir;
        vec![Effect::RefreshEligibility]
    }

    /// Scene reached by picking archives from the current scene, if any.
    pub fn archive_pick_target(&self) -> Option<SceneId> {
        match self.state.scene {
            SceneId::Home => Some(SceneId::ArchivesSelected),
            SceneId::OutputSelected => Some(SceneId::SourcesReady),
            _ => None,
        }
    }

    /// Scene reached by picking the output folder from the current scene, if any.
    pub fn output_pick_target(&self) -> Option<SceneId> {
        match self.state.scene {
            SceneId::Home => Some(SceneId::OutputSelected),
            SceneId::ArchivesSelected => Some(SceneId::SourcesReady),
            _ => None,
        }
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
