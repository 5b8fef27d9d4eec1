//! Smoothed progress counters for the interactive side.
//!
//! The worker only reports coarse checkpoints (`index / total`). Each new
//! target is spread over a fixed number of equal steps, one step per UI tick,
//! so bars fill smoothly instead of jumping.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Called with the displayed fraction every time a counter moves.
pub type ProgressSinkFn = Box<dyn FnMut(f64)>;

const SETTLE_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingSettings {
    /// Time a full transition to a new target takes.
    pub duration: Duration,
    /// Expected time between two ticks.
    pub interval: Duration,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(600),
            interval: Duration::from_millis(16),
        }
    }
}

impl SmoothingSettings {
    /// Number of intermediate updates per transition, never below 2.
    pub fn steps(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        let steps = self.duration.as_millis().max(1) / interval;
        u32::try_from(steps).unwrap_or(u32::MAX).max(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressCounter {
    current: f64,
    target: f64,
    steps_left: u32,
    step_delta: f64,
}

impl ProgressCounter {
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.steps_left > 0
    }
}

pub struct ProgressAggregator {
    settings: SmoothingSettings,
    counters: BTreeMap<String, ProgressCounter>,
    sinks: HashMap<String, ProgressSinkFn>,
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new(SmoothingSettings::default())
    }
}

impl ProgressAggregator {
    pub fn new(settings: SmoothingSettings) -> Self {
        Self {
            settings,
            counters: BTreeMap::new(),
            sinks: HashMap::new(),
        }
    }

    /// Registers the renderer callback for `counter`, replacing any previous one.
    pub fn register_sink(&mut self, counter: &str, sink: ProgressSinkFn) {
        self.sinks.insert(counter.to_string(), sink);
        self.counters.entry(counter.to_string()).or_default();
    }

    pub fn counter(&self, counter: &str) -> Option<&ProgressCounter> {
        self.counters.get(counter)
    }

    /// Displayed fraction of `counter`, 0.0 when unknown.
    pub fn current(&self, counter: &str) -> f64 {
        self.counters.get(counter).map_or(0.0, ProgressCounter::current)
    }

    pub fn is_animating(&self) -> bool {
        self.counters.values().any(ProgressCounter::is_animating)
    }

    /// Requests a new target for `counter`.
    ///
    /// The fraction is clamped to [0, 1]. Exactly 0.0 snaps immediately; any
    /// other value below the counter's displayed or pending value is ignored.
    pub fn set_target(&mut self, counter: &str, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let target = fraction.clamp(0.0, 1.0);
        if target == 0.0 {
            self.reset(counter);
            return;
        }

        let steps = self.settings.steps();
        let state = self.counters.entry(counter.to_string()).or_default();
        if target < state.current.max(state.target) {
            return;
        }
        if (target - state.current).abs() < SETTLE_EPSILON {
            state.current = target;
            state.target = target;
            state.steps_left = 0;
            let value = state.current;
            self.emit(counter, value);
            return;
        }

        state.target = target;
        state.steps_left = steps;
        state.step_delta = (target - state.current) / f64::from(steps);
    }

    /// Snaps `counter` to 0.0 and drops any running interpolation.
    pub fn reset(&mut self, counter: &str) {
        self.counters
            .insert(counter.to_string(), ProgressCounter::default());
        self.emit(counter, 0.0);
    }

    pub fn reset_all(&mut self) {
        let names: Vec<String> = self.counters.keys().cloned().collect();
        for name in names {
            self.reset(&name);
        }
    }

    /// Applies one interpolation step to every moving counter.
    ///
    /// Returns true while any counter still has steps left.
    pub fn tick(&mut self) -> bool {
        let mut updates = Vec::new();
        for (name, state) in self.counters.iter_mut() {
            if state.steps_left == 0 {
                continue;
            }
            if state.steps_left <= 1 {
                state.current = state.target;
                state.steps_left = 0;
            } else {
                state.current = (state.current + state.step_delta).min(state.target);
                state.steps_left -= 1;
            }
            updates.push((name.clone(), state.current));
        }
        for (name, value) in updates {
            self.emit(&name, value);
        }
        self.is_animating()
    }

    fn emit(&mut self, counter: &str, value: f64) {
        if let Some(sink) = self.sinks.get_mut(counter) {
            sink(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_give_thirty_seven_steps() {
        assert_eq!(SmoothingSettings::default().steps(), 37);
    }

    #[test]
    fn tiny_duration_still_uses_two_steps() {
        let settings = SmoothingSettings {
            duration: Duration::from_millis(1),
            interval: Duration::from_millis(16),
        };
        assert_eq!(settings.steps(), 2);
    }
}
