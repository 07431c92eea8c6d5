//! Display and reading settings

use crate::store::{PersistedSlice, PersistedStore};
use serde::{Deserialize, Serialize};

/// How moods are rendered in the mood picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MoodDisplayMode {
    /// Emoji only
    #[default]
    Emoji,
    /// Translated labels
    Text,
}

impl MoodDisplayMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            MoodDisplayMode::Emoji => MoodDisplayMode::Text,
            MoodDisplayMode::Text => MoodDisplayMode::Emoji,
        }
    }
}

impl From<String> for MoodDisplayMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => MoodDisplayMode::Text,
            "emoji" => MoodDisplayMode::Emoji,
            _ => MoodDisplayMode::default(),
        }
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ThemeMode {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl ThemeMode {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl From<String> for ThemeMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dark" => ThemeMode::Dark,
            "light" => ThemeMode::Light,
            _ => ThemeMode::default(),
        }
    }
}

/// User-facing settings, persisted under `settings-storage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsState {
    /// Mood picker rendering
    pub mood_display_mode: MoodDisplayMode,
    /// Whether the reader opens a random chapter
    pub random_reading_enabled: bool,
    /// Color theme
    pub theme_mode: ThemeMode,
}

impl SettingsState {
    /// Set the mood display mode
    pub fn set_mood_display_mode(&mut self, mode: MoodDisplayMode) {
        self.mood_display_mode = mode;
    }

    /// Switch between emoji and text moods
    pub fn toggle_mood_display_mode(&mut self) {
        self.mood_display_mode = self.mood_display_mode.toggled();
    }

    /// Enable or disable random reading
    pub fn set_random_reading_enabled(&mut self, enabled: bool) {
        self.random_reading_enabled = enabled;
    }

    /// Set the theme
    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
    }

    /// Switch between light and dark
    pub fn toggle_theme_mode(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
    }
}

impl PersistedSlice for SettingsState {
    type Snapshot = SettingsState;
    const STORAGE_KEY: &'static str = "settings-storage";

    fn partialize(&self) -> SettingsState {
        *self
    }

    fn merge(&mut self, snapshot: SettingsState) {
        *self = snapshot;
    }
}

/// Settings store
pub type SettingsStore = PersistedStore<SettingsState>;

impl PersistedStore<SettingsState> {
    /// Set the mood display mode
    pub fn set_mood_display_mode(&self, mode: MoodDisplayMode) {
        self.update(|s| s.set_mood_display_mode(mode));
    }

    /// Switch between emoji and text moods
    pub fn toggle_mood_display_mode(&self) {
        self.update(SettingsState::toggle_mood_display_mode);
    }

    /// Enable or disable random reading
    pub fn set_random_reading_enabled(&self, enabled: bool) {
        self.update(|s| s.set_random_reading_enabled(enabled));
    }

    /// Set the theme
    pub fn set_theme_mode(&self, mode: ThemeMode) {
        self.update(|s| s.set_theme_mode(mode));
    }

    /// Switch between light and dark
    pub fn toggle_theme_mode(&self) {
        self.update(SettingsState::toggle_theme_mode);
    }
}
