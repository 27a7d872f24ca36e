//! Core data types for parser results

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Slot name -> extracted value
pub type Params = BTreeMap<String, String>;

/// Base language every catalog starts with.
pub const BASE_LANGUAGE: &str = "en";

/// Parameter set on a pipe stage that asks for the previous stage's output.
pub const USE_PREVIOUS_PARAM: &str = "_use_previous";

/// Parameter a pipe stage's previous output is injected into.
pub const TARGET_PARAM: &str = "target";

/// A trigger word or phrase tagged with the language it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub lang: String,
}

impl Keyword {
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
        }
    }

    pub fn base(text: impl Into<String>) -> Self {
        Self::new(text, BASE_LANGUAGE)
    }
}

/// Definition of a routable intent.
///
/// Regex capture groups are mapped onto `slots` by position. A pattern may
/// have more or fewer groups than there are slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub name: String,
    pub keywords: Vec<Keyword>,
    pub patterns: Vec<String>,
    pub slots: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl IntentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            patterns: Vec::new(),
            slots: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Adds base-language keywords
    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        for keyword in keywords {
            self.push_keyword(Keyword::base(*keyword));
        }
        self
    }

    pub fn patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns.extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    pub fn slots(mut self, slots: &[&str]) -> Self {
        self.slots.extend(slots.iter().map(|s| s.to_string()));
        self
    }

    pub fn examples(mut self, examples: &[&str]) -> Self {
        self.examples.extend(examples.iter().map(|e| e.to_string()));
        self
    }

    /// Appends a keyword unless the same text is already present.
    /// Returns whether it was added.
    pub fn push_keyword(&mut self, keyword: Keyword) -> bool {
        if self.has_keyword(&keyword.text) {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    pub fn has_keyword(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| k.text == text)
    }
}

/// A number found in free text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

/// Intent-independent entities pulled out of the raw text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub numbers: Vec<Number>,
    pub datetime: Option<NaiveDateTime>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
            && self.emails.is_empty()
            && self.numbers.is_empty()
            && self.datetime.is_none()
    }
}

/// How the commands of a chain relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    /// Each stage's output feeds the next
    Pipe,
    /// Stages run independently
    Sequence,
    /// No delimiter found; a single command
    #[serde(rename = "none")]
    Single,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Pipe => "pipe",
            ChainType::Sequence => "sequence",
            ChainType::Single => "none",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing one input segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub raw_text: String,
    pub intent: Option<String>,
    pub confidence: f64,
    pub params: Params,
    pub entities: Entities,
    pub chain_type: Option<ChainType>,
    pub use_previous_output: bool,
}

impl ParsedCommand {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            intent: None,
            confidence: 0.0,
            params: Params::new(),
            entities: Entities::default(),
            chain_type: None,
            use_previous_output: false,
        }
    }

    pub fn is_understood(&self) -> bool {
        self.intent.is_some()
    }

    /// Whether this stage asked for the previous stage's output
    pub fn wants_previous_output(&self) -> bool {
        self.params.contains_key(USE_PREVIOUS_PARAM)
    }
}

/// Ordered commands derived from one input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandChain {
    pub commands: Vec<ParsedCommand>,
    pub chain_type: ChainType,
}

impl CommandChain {
    pub fn single(command: ParsedCommand) -> Self {
        Self {
            commands: vec![command],
            chain_type: ChainType::Single,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A user-specific phrase-to-intent override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub phrase: String,
    pub intent: String,
    #[serde(default)]
    pub params: Option<Params>,
    #[serde(default = "default_use_count")]
    pub use_count: u32,
}

fn default_use_count() -> u32 {
    1
}

impl LearnedPattern {
    pub fn new(phrase: &str, intent: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            phrase: normalize(phrase),
            intent: intent.into(),
            params,
            use_count: 1,
        }
    }
}

/// Which matching strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Learned,
    Phrase,
    Keyword,
}

/// A matched intent with its confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMatch {
    pub intent: String,
    pub confidence: f64,
    pub source: MatchSource,
    /// Params carried by a learned pattern
    pub params: Option<Params>,
}

impl IntentMatch {
    pub fn new(intent: impl Into<String>, confidence: f64, source: MatchSource) -> Self {
        Self {
            intent: intent.into(),
            confidence,
            source,
            params: None,
        }
    }
}

/// Lower-cases and trims text for matching
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
