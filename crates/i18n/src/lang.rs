//! Supported UI languages

use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use unic_langid::LanguageIdentifier;

/// A language the UI is translated into.
///
/// Deserializing an unknown code (for example one written by a newer app
/// version) yields [`Language::En`] instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    /// English, the default and fallback language
    #[default]
    En,
    /// Romanian
    Ro,
    /// Spanish
    Es,
}

impl Language {
    /// Every supported language, default first
    pub const ALL: [Language; 3] = [Language::En, Language::Ro, Language::Es];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ro => "ro",
            Language::Es => "es",
        }
    }

    /// Name of the language in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ro => "Română",
            Language::Es => "Español",
        }
    }

    /// Strict parse; `None` for unsupported codes
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "ro" => Some(Language::Ro),
            "es" => Some(Language::Es),
            _ => None,
        }
    }

    /// Lenient parse; unsupported codes resolve to the default language
    pub fn from_code(code: &str) -> Self {
        Self::parse(code).unwrap_or_default()
    }

    /// Whether this is the fallback language
    pub fn is_default(&self) -> bool {
        *self == Language::default()
    }

    /// Pick the best supported language for a device locale list.
    ///
    /// `requested` is in preference order (e.g. `["ro-RO", "en-US"]`).
    /// Unparseable tags are skipped; no match yields the default language.
    pub fn negotiate<S: AsRef<str>>(requested: &[S]) -> Self {
        let requested: Vec<LanguageIdentifier> = requested
            .iter()
            .filter_map(|tag| tag.as_ref().parse().ok())
            .collect();
        let available: Vec<LanguageIdentifier> = Self::ALL
            .iter()
            .filter_map(|lang| lang.code().parse().ok())
            .collect();

        let supported =
            negotiate_languages(&requested, &available, None, NegotiationStrategy::Filtering);

        supported
            .first()
            .map(|id| Self::from_code(id.language.as_str()))
            .unwrap_or_default()
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
