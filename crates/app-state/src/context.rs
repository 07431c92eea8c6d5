//! Application store context
//!
//! [`AppStores`] owns one instance of every store over a single injected
//! adapter. The UI layer receives it explicitly instead of reaching for
//! process-wide globals.

use crate::language::LanguageStore;
use crate::mood::MoodStore;
use crate::onboarding::OnboardingStore;
use crate::profile::{Gender, UserProfile, UserProfileStore};
use crate::reading::ReadingStore;
use crate::settings::SettingsStore;
use crate::store::Result;
use i18n::{Translator, Verse};
use std::sync::Arc;
use storage::{KeyValueStore, PersistenceConfig};

/// Every store the app uses
#[derive(Clone)]
pub struct AppStores {
    /// Display and reading settings
    pub settings: SettingsStore,
    /// UI language
    pub language: LanguageStore,
    /// Session mood
    pub mood: MoodStore,
    /// Bible reading progress
    pub reading: ReadingStore,
    /// User profile and onboarding-skipped flag
    pub profile: UserProfileStore,
    /// Onboarding position
    pub onboarding: OnboardingStore,
}

impl AppStores {
    /// Open every store on `kv` and start hydrating them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(kv: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Result<Self> {
        let stores = Self {
            settings: SettingsStore::open(Arc::clone(&kv), config)?,
            language: LanguageStore::open(Arc::clone(&kv), config)?,
            mood: MoodStore::open(Arc::clone(&kv), config)?,
            reading: ReadingStore::open(Arc::clone(&kv), config)?,
            profile: UserProfileStore::open(Arc::clone(&kv), config)?,
            onboarding: OnboardingStore::open(kv, config)?,
        };

        tracing::debug!(keys = ?stores.storage_keys(), "opened app stores");
        Ok(stores)
    }

    /// Stores that never touch storage
    pub fn detached() -> Self {
        Self {
            settings: SettingsStore::detached(),
            language: LanguageStore::detached(),
            mood: MoodStore::detached(),
            reading: ReadingStore::detached(),
            profile: UserProfileStore::detached(),
            onboarding: OnboardingStore::detached(),
        }
    }

    /// Every storage key in use, one per store
    pub fn storage_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![
            self.settings.storage_key(),
            self.language.storage_key(),
            self.mood.storage_key(),
            self.reading.storage_key(),
        ];
        keys.extend(self.profile.storage_keys());
        keys.push(self.onboarding.storage_key());
        keys
    }

    /// Whether every store has loaded
    pub fn is_hydrated(&self) -> bool {
        self.settings.is_hydrated()
            && self.language.is_hydrated()
            && self.mood.is_hydrated()
            && self.reading.is_hydrated()
            && self.profile.is_hydrated()
            && self.onboarding.is_hydrated()
    }

    /// Wait until every store has loaded
    pub async fn wait_hydrated(&self) {
        self.settings.wait_hydrated().await;
        self.language.wait_hydrated().await;
        self.mood.wait_hydrated().await;
        self.reading.wait_hydrated().await;
        self.profile.wait_hydrated().await;
        self.onboarding.wait_hydrated().await;
    }

    /// Wait until every queued write has reached storage
    pub async fn flush(&self) {
        self.settings.flush().await;
        self.language.flush().await;
        self.mood.flush().await;
        self.reading.flush().await;
        self.profile.flush().await;
        self.onboarding.flush().await;
    }

    /// Storage reset: every store back to defaults, every key deleted
    pub fn reset_all(&self) {
        self.settings.reset();
        self.language.reset();
        self.mood.reset();
        self.reading.reset();
        self.profile.reset();
        self.onboarding.reset();
        tracing::info!("reset all app stores");
    }

    /// Create the profile and apply its age-based mood display default
    pub fn create_profile(&self, name: impl Into<String>, age: u32, gender: Gender) -> UserProfile {
        let profile = self.profile.create_profile(name, age, gender);
        self.settings.set_mood_display_mode(profile.default_mood_display_mode());
        profile
    }

    /// Translate `key` into the current language
    pub fn translate(&self, translator: &Translator, key: &str, params: &[(&str, &str)]) -> String {
        translator.translate(self.language.language(), key, params)
    }

    /// Localize `verse` into the current language once it is known
    pub fn translate_verse(&self, translator: &Translator, verse: &Verse) -> Verse {
        translator.translate_verse(self.language.language(), self.language.is_hydrated(), verse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MoodDisplayMode;
    use i18n::Language;
    use storage::MemoryKvStore;

    #[test]
    fn test_storage_keys_are_distinct() {
        let keys = AppStores::detached().storage_keys();
        assert_eq!(
            keys,
            vec![
                "settings-storage",
                "language-storage",
                "mood-storage",
                "bible-storage",
                "user-profile",
                "onboarding-skipped",
                "onboarding-state",
            ]
        );

        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_create_profile_sets_mood_display() {
        let stores = AppStores::detached();

        stores.create_profile("Luca", 12, Gender::Male);
        assert_eq!(stores.settings.get().mood_display_mode, MoodDisplayMode::Emoji);

        stores.create_profile("Luca", 17, Gender::Male);
        assert_eq!(stores.settings.get().mood_display_mode, MoodDisplayMode::Text);
    }

    #[test]
    fn test_translate_uses_language_store() {
        let stores = AppStores::detached();
        let translator = Translator::builtin().unwrap();

        stores.language.set_language(Language::Ro);
        assert_eq!(stores.translate(&translator, "home.greeting", &[("name", "Ana")]), "Bună Ana");
    }

    #[tokio::test]
    async fn test_open_hydrates_everything() {
        let stores =
            AppStores::open(Arc::new(MemoryKvStore::new()), &PersistenceConfig::default())
                .unwrap();
        assert!(!stores.is_hydrated());

        stores.wait_hydrated().await;
        assert!(stores.is_hydrated());
    }

    #[tokio::test]
    async fn test_reset_all_clears_storage() {
        let kv = MemoryKvStore::new();
        let stores =
            AppStores::open(Arc::new(kv.clone()), &PersistenceConfig::default()).unwrap();
        stores.wait_hydrated().await;

        stores.create_profile("Ana", 20, Gender::Female);
        stores.reading.set_last_read("genesis", 1);
        stores.onboarding.complete_onboarding();
        stores.language.set_language(Language::Es);
        stores.flush().await;
        assert!(!kv.is_empty());

        stores.reset_all();
        stores.flush().await;

        assert!(kv.is_empty());
        assert!(stores.profile.profile().is_none());
        assert_eq!(stores.language.language(), Language::En);
    }
}
