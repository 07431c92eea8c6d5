//! UI language preference

use crate::store::{PersistedSlice, PersistedStore};
use i18n::Language;
use serde::{Deserialize, Serialize};

/// Language preference, persisted under `language-storage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageState {
    /// Selected UI language
    pub language: Language,
}

impl PersistedSlice for LanguageState {
    type Snapshot = LanguageState;
    const STORAGE_KEY: &'static str = "language-storage";

    fn partialize(&self) -> LanguageState {
        *self
    }

    fn merge(&mut self, snapshot: LanguageState) {
        *self = snapshot;
    }
}

/// Language store
pub type LanguageStore = PersistedStore<LanguageState>;

impl PersistedStore<LanguageState> {
    /// The language to render with.
    ///
    /// Always English until the stored preference has been loaded.
    pub fn language(&self) -> Language {
        if self.is_hydrated() {
            self.with(|s| s.language)
        } else {
            Language::default()
        }
    }

    /// Choose a language
    pub fn set_language(&self, language: Language) {
        self.update(|s| s.language = language);
    }

    /// Choose a language from a raw code; unsupported codes select English
    pub fn set_language_code(&self, code: &str) {
        self.set_language(Language::from_code(code));
    }

    /// Choose the best match for the device locales and return it
    pub fn set_language_from_locales<S: AsRef<str>>(&self, locales: &[S]) -> Language {
        let language = Language::negotiate(locales);
        self.set_language(language);
        language
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::open_hydrated;
    use std::sync::Arc;
    use storage::{MemoryKvStore, PersistenceConfig};

    fn stored(language: &str) -> MemoryKvStore {
        MemoryKvStore::with_items([(
            "language-storage",
            format!(r#"{{"state":{{"language":"{language}"}},"version":0}}"#),
        )])
    }

    #[tokio::test]
    async fn test_english_until_hydrated() {
        let store = LanguageStore::open(Arc::new(stored("ro")), &PersistenceConfig::default())
            .unwrap();

        assert!(!store.is_hydrated());
        assert_eq!(store.language(), Language::En);

        store.wait_hydrated().await;
        assert_eq!(store.language(), Language::Ro);
    }

    #[tokio::test]
    async fn test_unknown_stored_language_reads_as_english() {
        let store = open_hydrated::<LanguageState>(&stored("tlh")).await;
        assert_eq!(store.language(), Language::En);
    }

    #[tokio::test]
    async fn test_language_survives_reload() {
        let kv = MemoryKvStore::new();
        let store = open_hydrated::<LanguageState>(&kv).await;
        store.set_language(Language::Es);
        store.flush().await;

        let reloaded = open_hydrated::<LanguageState>(&kv).await;
        assert_eq!(reloaded.language(), Language::Es);
    }

    #[test]
    fn test_set_language_code() {
        let store = LanguageStore::detached();
        store.set_language_code("ro");
        assert_eq!(store.language(), Language::Ro);
        store.set_language_code("fr");
        assert_eq!(store.language(), Language::En);
    }

    #[test]
    fn test_set_language_from_locales() {
        let store = LanguageStore::detached();
        assert_eq!(store.set_language_from_locales(&["es-AR", "en-US"]), Language::Es);
        assert_eq!(store.language(), Language::Es);
    }
}
