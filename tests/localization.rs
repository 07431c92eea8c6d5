//! Localization integration tests
//!
//! The translator driven by the persisted language preference.

use app_state::AppStores;
use i18n::{Language, Translator, Verse};
use std::sync::Arc;
use storage::{MemoryKvStore, PersistenceConfig};

fn init_tracing() {
    daily_manna::init_logging("warn");
}

fn psalm_23_1() -> Verse {
    Verse {
        id: "psalm-23-1".to_string(),
        text: "The Lord is my shepherd; I shall not want.".to_string(),
        reference: "Psalm 23:1".to_string(),
        book: "Psalms".to_string(),
    }
}

fn stored_language(code: &str) -> MemoryKvStore {
    MemoryKvStore::with_items([(
        "language-storage",
        format!(r#"{{"state":{{"language":"{code}"}},"version":0}}"#),
    )])
}

#[tokio::test]
async fn test_english_until_language_hydrates() {
    init_tracing();
    let translator = Translator::builtin().unwrap();
    let stores =
        AppStores::open(Arc::new(stored_language("ro")), &PersistenceConfig::default()).unwrap();

    assert_eq!(stores.translate(&translator, "settings.title", &[]), "Settings");
    assert_eq!(stores.translate_verse(&translator, &psalm_23_1()), psalm_23_1());

    stores.wait_hydrated().await;

    assert_eq!(stores.translate(&translator, "settings.title", &[]), "Setări");
    let verse = stores.translate_verse(&translator, &psalm_23_1());
    assert_eq!(verse.reference, "Psalmul 23:1");
    assert_eq!(verse.book, "Psalmii");
}

#[tokio::test]
async fn test_missing_key_returns_key() {
    init_tracing();
    let translator = Translator::builtin().unwrap();
    let stores =
        AppStores::open(Arc::new(stored_language("ro")), &PersistenceConfig::default()).unwrap();
    stores.wait_hydrated().await;

    assert_eq!(stores.translate(&translator, "nonexistent_key", &[]), "nonexistent_key");
}

#[test]
fn test_params_substitution() {
    init_tracing();
    let translator = Translator::builtin().unwrap();

    assert_eq!(
        translator.translate(Language::En, "home.greeting", &[("name", "Ana")]),
        "Hello Ana"
    );
    assert_eq!(translator.translate(Language::En, "home.greeting", &[]), "Hello {name}");
    assert_eq!(
        translator.translate(
            Language::Es,
            "onboarding.step",
            &[("current", "1"), ("total", "3"), ("unused", "x")]
        ),
        "Paso 1 de 3"
    );
}

#[test]
fn test_verse_without_translation_keeps_original() {
    init_tracing();
    let translator = Translator::builtin().unwrap();
    let verse = Verse {
        id: "philippians-4-6".to_string(),
        text: "Do not be anxious about anything...".to_string(),
        reference: "Philippians 4:6".to_string(),
        book: "Philippians".to_string(),
    };

    let es = translator.translate_verse(Language::Es, true, &verse);
    assert_eq!(es, verse);

    let ro = translator.translate_verse(Language::Ro, true, &verse);
    assert_ne!(ro.text, verse.text);
    assert_eq!(ro.reference, verse.reference);
    assert_eq!(ro.book, verse.book);
}
