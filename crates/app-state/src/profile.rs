//! User profile and the onboarding-skipped flag
//!
//! The profile lives under `user-profile`; whether onboarding was skipped is a
//! separate flag under `onboarding-skipped`. Each key has its own store, and
//! [`UserProfileStore`] presents them together.

use crate::settings::MoodDisplayMode;
use crate::store::{PersistedSlice, PersistedStore, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{KeyValueStore, PersistenceConfig};

/// From this age moods default to text labels
pub const TEXT_MOODS_MIN_AGE: u32 = 16;

/// From this age the user is treated as an adult
pub const ADULT_MIN_AGE: u32 = 18;

/// Gender as chosen during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    /// Male
    #[default]
    Male,
    /// Female
    Female,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "female" => Gender::Female,
            "male" => Gender::Male,
            _ => Gender::default(),
        }
    }
}

impl Gender {
    /// Translation key of the label
    pub fn translation_key(&self) -> &'static str {
        match self {
            Gender::Male => "profile.male",
            Gender::Female => "profile.female",
        }
    }
}

/// The user's profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender
    pub gender: Gender,
    /// Whether onboarding was finished for this profile
    pub is_onboarding_complete: bool,
}

impl UserProfile {
    /// New profile with onboarding not yet complete
    pub fn new(name: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self { name: name.into().trim().to_string(), age, gender, is_onboarding_complete: false }
    }

    /// Whether moods should default to text labels
    pub fn prefers_text_moods(&self) -> bool {
        self.age >= TEXT_MOODS_MIN_AGE
    }

    /// Whether the user is an adult
    pub fn is_adult(&self) -> bool {
        self.age >= ADULT_MIN_AGE
    }

    /// Mood display mode suited to this age
    pub fn default_mood_display_mode(&self) -> MoodDisplayMode {
        if self.prefers_text_moods() {
            MoodDisplayMode::Text
        } else {
            MoodDisplayMode::Emoji
        }
    }

    /// Apply the set fields of `update`
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(complete) = update.is_onboarding_complete {
            self.is_onboarding_complete = complete;
        }
    }
}

/// Partial profile change; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New name
    pub name: Option<String>,
    /// New age
    pub age: Option<u32>,
    /// New gender
    pub gender: Option<Gender>,
    /// New onboarding flag
    pub is_onboarding_complete: Option<bool>,
}

/// Profile slot, persisted under `user-profile`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileState {
    /// `None` until a profile is created
    pub profile: Option<UserProfile>,
}

impl PersistedSlice for ProfileState {
    type Snapshot = ProfileState;
    const STORAGE_KEY: &'static str = "user-profile";

    fn partialize(&self) -> ProfileState {
        self.clone()
    }

    fn merge(&mut self, snapshot: ProfileState) {
        *self = snapshot;
    }
}

/// Whether the user skipped onboarding, persisted under `onboarding-skipped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OnboardingSkipped {
    /// The flag
    pub skipped: bool,
}

impl PersistedSlice for OnboardingSkipped {
    type Snapshot = bool;
    const STORAGE_KEY: &'static str = "onboarding-skipped";

    fn partialize(&self) -> bool {
        self.skipped
    }

    fn merge(&mut self, snapshot: bool) {
        self.skipped = snapshot;
    }
}

/// Profile store plus the onboarding-skipped flag
#[derive(Clone)]
pub struct UserProfileStore {
    profile: PersistedStore<ProfileState>,
    skipped: PersistedStore<OnboardingSkipped>,
}

impl UserProfileStore {
    /// Open both keys on `kv` and start hydrating them
    pub fn open(kv: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Result<Self> {
        Ok(Self {
            profile: PersistedStore::open(Arc::clone(&kv), config)?,
            skipped: PersistedStore::open(kv, config)?,
        })
    }

    /// Store that never touches storage
    pub fn detached() -> Self {
        Self { profile: PersistedStore::detached(), skipped: PersistedStore::detached() }
    }

    /// Current profile, if created
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.with(|s| s.profile.clone())
    }

    /// Whether a profile exists
    pub fn has_profile(&self) -> bool {
        self.profile.with(|s| s.profile.is_some())
    }

    /// Create (or replace) the profile and return it
    pub fn create_profile(&self, name: impl Into<String>, age: u32, gender: Gender) -> UserProfile {
        let profile = UserProfile::new(name, age, gender);
        self.profile.update(|s| s.profile = Some(profile.clone()));
        profile
    }

    /// Change fields of the existing profile. Returns `false` if there is none.
    pub fn update_profile(&self, update: ProfileUpdate) -> bool {
        if !self.has_profile() {
            return false;
        }
        self.profile.update(|s| match s.profile.as_mut() {
            Some(profile) => {
                profile.apply(update);
                true
            }
            None => false,
        })
    }

    /// Mark onboarding finished on the existing profile
    pub fn complete_onboarding(&self) -> bool {
        self.update_profile(ProfileUpdate {
            is_onboarding_complete: Some(true),
            ..Default::default()
        })
    }

    /// Drop the profile, keeping the skipped flag
    pub fn clear_profile(&self) {
        self.profile.reset();
    }

    /// Record whether onboarding was skipped
    pub fn set_onboarding_skipped(&self, skipped: bool) {
        self.skipped.update(|s| s.skipped = skipped);
    }

    /// Whether onboarding was skipped
    pub fn is_onboarding_skipped(&self) -> bool {
        self.skipped.with(|s| s.skipped)
    }

    /// Whether moods should default to text for this user
    pub fn prefers_text_moods(&self) -> bool {
        self.profile().is_some_and(|p| p.prefers_text_moods())
    }

    /// Whether the user is an adult
    pub fn is_adult(&self) -> bool {
        self.profile().is_some_and(|p| p.is_adult())
    }

    /// Whether both keys have been loaded
    pub fn is_hydrated(&self) -> bool {
        self.profile.is_hydrated() && self.skipped.is_hydrated()
    }

    /// Wait for both keys to load
    pub async fn wait_hydrated(&self) {
        self.profile.wait_hydrated().await;
        self.skipped.wait_hydrated().await;
    }

    /// Wait for queued writes on both keys
    pub async fn flush(&self) {
        self.profile.flush().await;
        self.skipped.flush().await;
    }

    /// Delete the profile and the skipped flag
    pub fn reset(&self) {
        self.profile.reset();
        self.skipped.reset();
    }

    /// Storage keys owned by this store
    pub fn storage_keys(&self) -> [&'static str; 2] {
        [self.profile.storage_key(), self.skipped.storage_key()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryKvStore;

    async fn open_hydrated(kv: &MemoryKvStore) -> UserProfileStore {
        let store =
            UserProfileStore::open(Arc::new(kv.clone()), &PersistenceConfig::default()).unwrap();
        store.wait_hydrated().await;
        store
    }

    #[test]
    fn test_age_thresholds_are_independent() {
        let child = UserProfile::new("Ana", 12, Gender::Female);
        assert!(!child.prefers_text_moods());
        assert!(!child.is_adult());
        assert_eq!(child.default_mood_display_mode(), MoodDisplayMode::Emoji);

        let teen = UserProfile::new("Ana", 16, Gender::Female);
        assert!(teen.prefers_text_moods());
        assert!(!teen.is_adult());

        let adult = UserProfile::new("Ana", 18, Gender::Female);
        assert!(adult.prefers_text_moods());
        assert!(adult.is_adult());
        assert_eq!(adult.default_mood_display_mode(), MoodDisplayMode::Text);
    }

    #[test]
    fn test_profile_absent_until_created() {
        let store = UserProfileStore::detached();
        assert!(store.profile().is_none());
        assert!(!store.update_profile(ProfileUpdate { age: Some(30), ..Default::default() }));
        assert!(!store.is_adult());

        let created = store.create_profile("  Ion ", 30, Gender::Male);
        assert_eq!(created.name, "Ion");
        assert_eq!(store.profile(), Some(created));
        assert!(store.is_adult());
    }

    #[test]
    fn test_update_profile() {
        let store = UserProfileStore::detached();
        store.create_profile("Maria", 15, Gender::Female);

        assert!(store.update_profile(ProfileUpdate { age: Some(17), ..Default::default() }));
        assert!(store.complete_onboarding());

        let profile = store.profile().unwrap();
        assert_eq!(profile.age, 17);
        assert_eq!(profile.name, "Maria");
        assert!(profile.is_onboarding_complete);
    }

    #[test]
    fn test_unknown_gender_coerces() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"name":"A","age":20,"gender":"other"}"#).unwrap();
        assert_eq!(profile.gender, Gender::Male);
        assert!(!profile.is_onboarding_complete);
    }

    #[tokio::test]
    async fn test_profile_and_flag_survive_reload() {
        let kv = MemoryKvStore::new();

        let store = open_hydrated(&kv).await;
        store.create_profile("Elena", 22, Gender::Female);
        store.set_onboarding_skipped(true);
        store.flush().await;

        assert!(kv.raw("user-profile").is_some());
        assert!(kv.raw("onboarding-skipped").is_some());

        let reloaded = open_hydrated(&kv).await;
        assert_eq!(reloaded.profile().map(|p| p.name), Some("Elena".to_string()));
        assert!(reloaded.is_onboarding_skipped());
    }

    #[tokio::test]
    async fn test_reset_removes_both_keys() {
        let kv = MemoryKvStore::new();
        let store = open_hydrated(&kv).await;
        store.create_profile("Elena", 22, Gender::Female);
        store.set_onboarding_skipped(true);
        store.flush().await;

        store.reset();
        store.reset();
        store.flush().await;

        assert!(store.profile().is_none());
        assert!(!store.is_onboarding_skipped());
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_clear_profile_keeps_flag() {
        let kv = MemoryKvStore::new();
        let store = open_hydrated(&kv).await;
        store.create_profile("Elena", 22, Gender::Female);
        store.set_onboarding_skipped(true);
        store.clear_profile();
        store.flush().await;

        assert!(kv.raw("user-profile").is_none());
        assert!(store.is_onboarding_skipped());
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(
            UserProfileStore::detached().storage_keys(),
            ["user-profile", "onboarding-skipped"]
        );
    }
}
