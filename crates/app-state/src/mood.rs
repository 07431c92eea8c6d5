//! Mood selection
//!
//! The selected mood is session-only: it is never written to storage and is
//! cleared on every hydration, so each launch starts with a fresh mood prompt.

use crate::settings::MoodDisplayMode;
use crate::store::{PersistedSlice, PersistedStore};
use i18n::{Language, Translator};
use serde::{Deserialize, Serialize};

/// A mood the user can pick to get verse suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    /// Happy
    Happy,
    /// Sad
    Sad,
    /// Anxious
    Anxious,
    /// Grateful
    Grateful,
    /// Angry
    Angry,
    /// Lonely
    Lonely,
    /// Peaceful
    Peaceful,
    /// Tired
    Tired,
}

impl MoodType {
    /// Every mood, in picker order
    pub const ALL: [MoodType; 8] = [
        MoodType::Happy,
        MoodType::Sad,
        MoodType::Anxious,
        MoodType::Grateful,
        MoodType::Angry,
        MoodType::Lonely,
        MoodType::Peaceful,
        MoodType::Tired,
    ];

    /// Emoji shown in emoji mode
    pub fn emoji(&self) -> &'static str {
        match self {
            MoodType::Happy => "😊",
            MoodType::Sad => "😢",
            MoodType::Anxious => "😰",
            MoodType::Grateful => "🙏",
            MoodType::Angry => "😠",
            MoodType::Lonely => "😔",
            MoodType::Peaceful => "😌",
            MoodType::Tired => "😴",
        }
    }

    /// Translation key of the mood label
    pub fn translation_key(&self) -> &'static str {
        match self {
            MoodType::Happy => "mood.happy",
            MoodType::Sad => "mood.sad",
            MoodType::Anxious => "mood.anxious",
            MoodType::Grateful => "mood.grateful",
            MoodType::Angry => "mood.angry",
            MoodType::Lonely => "mood.lonely",
            MoodType::Peaceful => "mood.peaceful",
            MoodType::Tired => "mood.tired",
        }
    }

    /// What the picker shows for this mood
    pub fn display(
        &self,
        mode: MoodDisplayMode,
        translator: &Translator,
        language: Language,
    ) -> String {
        match mode {
            MoodDisplayMode::Emoji => self.emoji().to_string(),
            MoodDisplayMode::Text => translator.t(language, self.translation_key()),
        }
    }
}

/// Current and last mood of this session, stored under `mood-storage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoodState {
    /// Mood currently driving suggestions
    pub selected_mood: Option<MoodType>,
    /// Most recent mood picked this session
    pub last_selected_mood: Option<MoodType>,
}

/// Persisted form of [`MoodState`]: intentionally empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoodSnapshot {}

impl MoodState {
    /// Pick a mood
    pub fn set_selected_mood(&mut self, mood: MoodType) {
        self.selected_mood = Some(mood);
        self.last_selected_mood = Some(mood);
    }

    /// Dismiss the current mood, remembering it as the last one
    pub fn clear_selected_mood(&mut self) {
        self.selected_mood = None;
    }
}

impl PersistedSlice for MoodState {
    type Snapshot = MoodSnapshot;
    const STORAGE_KEY: &'static str = "mood-storage";

    fn partialize(&self) -> MoodSnapshot {
        MoodSnapshot {}
    }

    fn merge(&mut self, _snapshot: MoodSnapshot) {}

    fn on_rehydrate(&mut self) {
        self.selected_mood = None;
        self.last_selected_mood = None;
    }
}

/// Mood store
pub type MoodStore = PersistedStore<MoodState>;

impl PersistedStore<MoodState> {
    /// Pick a mood
    pub fn set_selected_mood(&self, mood: MoodType) {
        self.update(|s| s.set_selected_mood(mood));
    }

    /// Dismiss the current mood
    pub fn clear_selected_mood(&self) {
        self.update(MoodState::clear_selected_mood);
    }

    /// Mood currently driving suggestions
    pub fn selected_mood(&self) -> Option<MoodType> {
        self.with(|s| s.selected_mood)
    }
}
