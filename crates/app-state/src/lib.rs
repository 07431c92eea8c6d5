//! Application state management for Daily Manna
//!
//! This crate provides the persisted stores behind the UI: settings,
//! language, mood, reading progress, user profile and onboarding. Each store
//! updates in memory synchronously and writes behind to a key-value adapter.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod language;
pub mod mood;
pub mod onboarding;
pub mod profile;
pub mod reading;
pub mod settings;
pub mod store;

pub use context::AppStores;
pub use language::{LanguageState, LanguageStore};
pub use mood::{MoodState, MoodStore, MoodType};
pub use onboarding::{OnboardingState, OnboardingStore, TOTAL_STEPS};
pub use profile::{Gender, ProfileUpdate, UserProfile, UserProfileStore};
pub use reading::{ReadingProgress, ReadingStore};
pub use settings::{MoodDisplayMode, SettingsState, SettingsStore, ThemeMode};
pub use store::{PersistedSlice, PersistedStore, StoreError};
