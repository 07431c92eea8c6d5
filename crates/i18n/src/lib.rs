//! Internationalization for Daily Manna
//!
//! This crate provides the supported UI languages, device-locale negotiation,
//! string lookup with placeholder substitution, and verse localization.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lang;
pub mod translator;

pub use lang::Language;
pub use translator::{interpolate, I18nError, Translator, Verse, VerseTranslation};
