//! Parser configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParserError;

/// Confidence scores and acceptance floors used by the matching pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Exact learned-phrase hit (and accepted fuzzy learned hit)
    pub learned_exact: f64,
    /// Learned fuzzy ratio must exceed this
    pub learned_fuzzy_floor: f64,
    /// Phrase variant literally contained in the text
    pub phrase_contains: f64,
    /// Phrase partial ratio must exceed this
    pub phrase_fuzzy_floor: f64,
    /// Keyword literally contained in the text
    pub keyword_contains: f64,
    /// Per-word keyword ratio must exceed this
    pub keyword_fuzzy_floor: f64,
    /// Any intent regex matching the text
    pub regex_match: f64,
    /// Keyword/regex results below this are discarded
    pub acceptance_floor: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            learned_exact: 0.98,
            learned_fuzzy_floor: 0.90,
            phrase_contains: 0.92,
            phrase_fuzzy_floor: 0.85,
            keyword_contains: 0.90,
            keyword_fuzzy_floor: 0.80,
            regex_match: 0.95,
            acceptance_floor: 0.60,
        }
    }
}

/// Top-level parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub thresholds: Thresholds,
    /// Language packs merged at construction, besides English
    pub languages: Vec<String>,
    /// Optional cap on learned patterns per user. When set, the least used
    /// pattern is evicted once the cap is exceeded. `None` (the default)
    /// keeps every correction for the life of the session.
    pub max_learned_per_user: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            languages: Vec::new(),
            max_learned_per_user: None,
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ParserError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParserError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ParserError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }
}
