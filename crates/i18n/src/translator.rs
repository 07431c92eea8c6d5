//! String and verse lookup
//!
//! Lookups never fail: a key missing from the requested language falls back
//! to English, and a key missing from English comes back verbatim.

use crate::lang::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const EN_STRINGS: &str = include_str!("../locales/en.json");
const RO_STRINGS: &str = include_str!("../locales/ro.json");
const ES_STRINGS: &str = include_str!("../locales/es.json");
const VERSES: &str = include_str!("../locales/verses.json");

/// Translation loading errors
#[derive(Debug, Error)]
pub enum I18nError {
    /// Dictionary JSON could not be parsed
    #[error("Invalid dictionary for {language}: {source}")]
    InvalidDictionary {
        /// Language (or "verses") whose data failed to parse
        language: String,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

/// Result type for translation loading
pub type Result<T> = std::result::Result<T, I18nError>;

/// A Bible verse as shown in the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Stable identifier, e.g. `john-3-16`
    pub id: String,
    /// Verse text
    pub text: String,
    /// Human-readable reference, e.g. `John 3:16`
    pub reference: String,
    /// Book name
    pub book: String,
}

/// Localized fields of a verse; absent fields keep the original
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseTranslation {
    /// Translated text
    #[serde(default)]
    pub text: Option<String>,
    /// Translated reference
    #[serde(default)]
    pub reference: Option<String>,
    /// Translated book name
    #[serde(default)]
    pub book: Option<String>,
}

type Dictionary = HashMap<String, String>;

/// Dictionary-backed translator
#[derive(Debug, Clone, Default)]
pub struct Translator {
    strings: HashMap<Language, Dictionary>,
    verses: HashMap<Language, HashMap<String, VerseTranslation>>,
}

impl Translator {
    /// Create a translator with no dictionaries (every lookup returns the key)
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator over the dictionaries shipped with the app
    pub fn builtin() -> Result<Self> {
        let mut translator = Self::new();
        translator.load_strings(Language::En, EN_STRINGS)?;
        translator.load_strings(Language::Ro, RO_STRINGS)?;
        translator.load_strings(Language::Es, ES_STRINGS)?;
        translator.load_verses(VERSES)?;
        Ok(translator)
    }

    /// Build from a `{lang: {key: string}}` document and a
    /// `{lang: {verse_id: {text, reference, book}}}` document.
    ///
    /// Unsupported language codes are skipped.
    pub fn from_json(strings: &str, verses: &str) -> Result<Self> {
        let all: HashMap<String, Dictionary> =
            serde_json::from_str(strings).map_err(|source| I18nError::InvalidDictionary {
                language: "strings".to_string(),
                source,
            })?;

        let mut translator = Self::new();
        for (code, dictionary) in all {
            match Language::parse(&code) {
                Some(language) => {
                    translator.strings.insert(language, dictionary);
                }
                None => tracing::debug!(code = %code, "skipping unsupported language"),
            }
        }
        translator.load_verses(verses)?;
        Ok(translator)
    }

    /// Replace the string dictionary for one language
    pub fn load_strings(&mut self, language: Language, json: &str) -> Result<()> {
        let dictionary: Dictionary =
            serde_json::from_str(json).map_err(|source| I18nError::InvalidDictionary {
                language: language.code().to_string(),
                source,
            })?;
        self.strings.insert(language, dictionary);
        Ok(())
    }

    /// Merge a verse-translation document into this translator
    pub fn load_verses(&mut self, json: &str) -> Result<()> {
        let all: HashMap<String, HashMap<String, VerseTranslation>> = serde_json::from_str(json)
            .map_err(|source| I18nError::InvalidDictionary {
                language: "verses".to_string(),
                source,
            })?;

        for (code, verses) in all {
            if let Some(language) = Language::parse(&code) {
                self.verses.entry(language).or_default().extend(verses);
            }
        }
        Ok(())
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.strings
            .get(&language)
            .and_then(|dictionary| dictionary.get(key))
            .map(String::as_str)
    }

    /// Localized string for `key`, with `{name}` placeholders replaced from `params`
    pub fn translate(&self, language: Language, key: &str, params: &[(&str, &str)]) -> String {
        let resolved = self
            .lookup(language, key)
            .or_else(|| self.lookup(Language::default(), key))
            .unwrap_or(key);

        interpolate(resolved, params)
    }

    /// Shorthand for [`translate`](Self::translate) without params
    pub fn t(&self, language: Language, key: &str) -> String {
        self.translate(language, key, &[])
    }

    /// Same as [`translate`](Self::translate) for a raw language code.
    /// Unsupported codes are looked up in English.
    pub fn translate_code(&self, code: &str, key: &str, params: &[(&str, &str)]) -> String {
        self.translate(Language::from_code(code), key, params)
    }

    /// Localized copy of `verse`.
    ///
    /// Returns the verse unchanged until the language preference has hydrated,
    /// for English, and for verses with no translation. Missing fields keep
    /// the original value.
    pub fn translate_verse(&self, language: Language, is_hydrated: bool, verse: &Verse) -> Verse {
        if !is_hydrated || language.is_default() {
            return verse.clone();
        }

        let Some(translation) = self.verses.get(&language).and_then(|v| v.get(&verse.id)) else {
            return verse.clone();
        };

        Verse {
            id: verse.id.clone(),
            text: translation.text.clone().unwrap_or_else(|| verse.text.clone()),
            reference: translation.reference.clone().unwrap_or_else(|| verse.reference.clone()),
            book: translation.book.clone().unwrap_or_else(|| verse.book.clone()),
        }
    }

    /// Keys defined in English but missing from `language`, sorted
    pub fn missing_keys(&self, language: Language) -> Vec<String> {
        let Some(reference) = self.strings.get(&Language::default()) else {
            return Vec::new();
        };
        let target = self.strings.get(&language);

        let mut missing: Vec<String> = reference
            .keys()
            .filter(|key| target.map_or(true, |dictionary| !dictionary.contains_key(*key)))
            .cloned()
            .collect();
        missing.sort();
        missing
    }
}

/// Replace every `{name}` in `template` with its value from `params`.
///
/// The template is scanned once, so substituted values are never
/// themselves expanded. Params absent from the template are ignored;
/// placeholders with no param are left as-is.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match params.iter().find(|(param, _)| *param == name) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
