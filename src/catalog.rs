//! Intent catalog
//!
//! Registry of intent definitions plus the phrase-variation table. Entries
//! are kept in registration order, which is also the tie-break order used by
//! the matcher. Definitions are never removed; re-registering a name replaces
//! the definition in place.

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use crate::builtin;
use crate::error::ParserError;
use crate::lang::{self, LanguagePack};
use crate::types::{IntentDefinition, Keyword, BASE_LANGUAGE};

/// A registered intent with its compiled patterns
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub definition: IntentDefinition,
    pub regexes: Vec<Regex>,
}

#[derive(Debug, Clone, Default)]
pub struct IntentCatalog {
    intents: IndexMap<String, CatalogEntry>,
    phrases: IndexMap<String, Vec<Keyword>>,
    languages: Vec<String>,
}

impl IntentCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with the built-in English intents and phrases
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for definition in builtin::default_intents() {
            catalog
                .register(definition)
                .expect("Invalid built-in intent pattern");
        }
        for (intent, phrases) in builtin::default_phrases() {
            catalog.register_phrases(intent, phrases);
        }
        catalog
    }

    /// Inserts or replaces an intent definition by name
    pub fn register(&mut self, definition: IntentDefinition) -> Result<(), ParserError> {
        let regexes = compile_patterns(&definition)?;
        debug!(intent = %definition.name, patterns = regexes.len(), "registered intent");
        self.intents.insert(
            definition.name.clone(),
            CatalogEntry {
                definition,
                regexes,
            },
        );
        Ok(())
    }

    /// Appends base-language phrase variants for an intent
    pub fn register_phrases(&mut self, intent: &str, phrases: &[&str]) {
        let entry = self.phrases.entry(intent.to_string()).or_default();
        for phrase in phrases {
            push_unique(entry, Keyword::base(phrase.to_lowercase()));
        }
    }

    /// Appends a language's keywords and phrases to the intents it names.
    ///
    /// Existing entries are never removed. Returns false (and changes
    /// nothing) for the base language or a language already merged.
    pub fn merge_language(&mut self, code: &str, pack: &LanguagePack) -> bool {
        if code == BASE_LANGUAGE || self.languages.iter().any(|l| l == code) {
            return false;
        }

        let mut merged = 0;
        for (intent, translation) in pack {
            let Some(entry) = self.intents.get_mut(intent) else {
                debug!(lang = code, %intent, "skipping translation for unknown intent");
                continue;
            };

            for text in translation.keywords.iter().chain(&translation.phrases) {
                if entry.definition.push_keyword(Keyword::new(text.to_lowercase(), code)) {
                    merged += 1;
                }
            }

            let phrases = self.phrases.entry(intent.clone()).or_default();
            for phrase in &translation.phrases {
                push_unique(phrases, Keyword::new(phrase.to_lowercase(), code));
            }
        }

        self.languages.push(code.to_string());
        info!(lang = code, keywords = merged, "merged language pack");
        true
    }

    /// Merges an embedded language pack. Unsupported codes are a no-op.
    pub fn load_language(&mut self, code: &str) -> bool {
        match lang::language_pack(code) {
            Some(pack) => self.merge_language(code, pack),
            None => {
                debug!(lang = code, "no language pack available");
                false
            }
        }
    }

    /// Returns how many of the given languages were newly merged
    pub fn load_languages<S: AsRef<str>>(&mut self, codes: &[S]) -> usize {
        codes
            .iter()
            .filter(|code| self.load_language(code.as_ref()))
            .count()
    }

    /// Base language first, then merged languages in load order
    pub fn loaded_languages(&self) -> Vec<String> {
        let mut langs = Vec::with_capacity(self.languages.len() + 1);
        langs.push(BASE_LANGUAGE.to_string());
        langs.extend(self.languages.iter().cloned());
        langs
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.intents.contains_key(intent)
    }

    pub fn get(&self, intent: &str) -> Option<&IntentDefinition> {
        self.intents.get(intent).map(|e| &e.definition)
    }

    pub fn entry(&self, intent: &str) -> Option<&CatalogEntry> {
        self.intents.get(intent)
    }

    /// Entries in registration order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.intents.values()
    }

    /// Phrase variants per intent, in registration order
    pub fn phrase_table(&self) -> impl Iterator<Item = (&str, &[Keyword])> {
        self.phrases
            .iter()
            .map(|(intent, phrases)| (intent.as_str(), phrases.as_slice()))
    }

    pub fn intent_names(&self) -> Vec<&str> {
        self.intents.keys().map(|k| k.as_str()).collect()
    }

    pub fn examples(&self, intent: &str) -> &[String] {
        self.get(intent)
            .map(|d| d.examples.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

fn compile_patterns(definition: &IntentDefinition) -> Result<Vec<Regex>, ParserError> {
    definition
        .patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ParserError::InvalidPattern {
                    intent: definition.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

fn push_unique(list: &mut Vec<Keyword>, keyword: Keyword) {
    if !list.iter().any(|k| k.text == keyword.text) {
        list.push(keyword);
    }
}
