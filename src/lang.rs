//! Language packs
//!
//! Each pack maps English intent names to translated keywords and phrase
//! variants. Packs are plain dictionary data, compiled into the crate and
//! parsed on first use.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::BASE_LANGUAGE;

/// Translations for a single intent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentTranslation {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Intent name -> translations, in pack order
pub type LanguagePack = IndexMap<String, IntentTranslation>;

const PACK_SOURCES: &[(&str, &str)] = &[
    ("es", include_str!("lang/es.json")),
    ("fr", include_str!("lang/fr.json")),
    ("de", include_str!("lang/de.json")),
    ("pt", include_str!("lang/pt.json")),
    ("it", include_str!("lang/it.json")),
    ("nl", include_str!("lang/nl.json")),
    ("ru", include_str!("lang/ru.json")),
    ("zh", include_str!("lang/zh.json")),
    ("ja", include_str!("lang/ja.json")),
    ("ko", include_str!("lang/ko.json")),
    ("ar", include_str!("lang/ar.json")),
    ("tr", include_str!("lang/tr.json")),
];

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish (Español)"),
    ("fr", "French (Français)"),
    ("de", "German (Deutsch)"),
    ("pt", "Portuguese (Português)"),
    ("it", "Italian (Italiano)"),
    ("nl", "Dutch (Nederlands)"),
    ("ru", "Russian (Русский)"),
    ("zh", "Chinese (中文)"),
    ("ja", "Japanese (日本語)"),
    ("ko", "Korean (한국어)"),
    ("ar", "Arabic (العربية)"),
    ("tr", "Turkish (Türkçe)"),
];

static PACKS: Lazy<IndexMap<&'static str, LanguagePack>> = Lazy::new(|| {
    PACK_SOURCES
        .iter()
        .map(|(code, source)| {
            let pack: LanguagePack =
                serde_json::from_str(source).expect("Invalid embedded language pack");
            (*code, pack)
        })
        .collect()
});

/// Supported language codes: English first, then the packs sorted by code
pub fn supported_languages() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = PACK_SOURCES.iter().map(|(code, _)| *code).collect();
    codes.sort_unstable();
    codes.insert(0, BASE_LANGUAGE);
    codes
}

/// Human-readable name, or the code itself when unknown
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// The embedded pack for a language, if one exists
pub fn language_pack(code: &str) -> Option<&'static LanguagePack> {
    PACKS.get(code)
}

pub fn keywords_for_intent(code: &str, intent: &str) -> &'static [String] {
    language_pack(code)
        .and_then(|pack| pack.get(intent))
        .map(|t| t.keywords.as_slice())
        .unwrap_or(&[])
}

pub fn phrases_for_intent(code: &str, intent: &str) -> &'static [String] {
    language_pack(code)
        .and_then(|pack| pack.get(intent))
        .map(|t| t.phrases.as_slice())
        .unwrap_or(&[])
}
