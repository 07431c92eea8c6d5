//! Onboarding flow position

use crate::store::{PersistedSlice, PersistedStore};
use serde::{Deserialize, Serialize};

/// Number of onboarding steps
pub const TOTAL_STEPS: u32 = 3;

/// Onboarding progress, persisted under `onboarding-state`.
///
/// Fields are private so the step can only move through the clamping
/// methods; `current_step` stays within `0..=total_steps` and
/// `total_steps` is always [`TOTAL_STEPS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingState {
    is_completed: bool,
    current_step: u32,
    total_steps: u32,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self { is_completed: false, current_step: 0, total_steps: TOTAL_STEPS }
    }
}

impl OnboardingState {
    /// Whether the flow was finished
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Current step
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Step count
    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Move to `step`, clamped into `0..=total_steps`
    pub fn set_current_step(&mut self, step: i64) {
        self.current_step = step.clamp(0, i64::from(self.total_steps)) as u32;
    }

    /// Advance one step, stopping at the last
    pub fn next_step(&mut self) {
        self.set_current_step(i64::from(self.current_step) + 1);
    }

    /// Go back one step, stopping at the first
    pub fn previous_step(&mut self) {
        self.set_current_step(i64::from(self.current_step) - 1);
    }

    /// Finish the flow
    pub fn complete_onboarding(&mut self) {
        self.is_completed = true;
        self.current_step = self.total_steps;
    }

    /// Fraction of steps done
    pub fn progress(&self) -> f32 {
        if self.total_steps == 0 {
            return 1.0;
        }
        self.current_step as f32 / self.total_steps as f32
    }
}

impl PersistedSlice for OnboardingState {
    type Snapshot = OnboardingState;
    const STORAGE_KEY: &'static str = "onboarding-state";

    fn partialize(&self) -> OnboardingState {
        *self
    }

    fn merge(&mut self, snapshot: OnboardingState) {
        self.total_steps = TOTAL_STEPS;
        self.set_current_step(i64::from(snapshot.current_step));
        if snapshot.is_completed {
            self.complete_onboarding();
        }
    }

    fn normalize(&mut self) {
        self.total_steps = TOTAL_STEPS;
        self.set_current_step(i64::from(self.current_step));
    }
}

/// Onboarding store
pub type OnboardingStore = PersistedStore<OnboardingState>;

impl PersistedStore<OnboardingState> {
    /// Move to `step`, clamped into range
    pub fn set_current_step(&self, step: i64) {
        self.update(|s| s.set_current_step(step));
    }

    /// Advance one step
    pub fn next_step(&self) {
        self.update(OnboardingState::next_step);
    }

    /// Go back one step
    pub fn previous_step(&self) {
        self.update(OnboardingState::previous_step);
    }

    /// Finish the flow
    pub fn complete_onboarding(&self) {
        self.update(OnboardingState::complete_onboarding);
    }

    /// Whether the flow was finished
    pub fn is_completed(&self) -> bool {
        self.with(OnboardingState::is_completed)
    }

    /// Current step
    pub fn current_step(&self) -> u32 {
        self.with(OnboardingState::current_step)
    }
}
