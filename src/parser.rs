//! Command parser
//!
//! Ties the catalog, matcher, extractors, chain splitter and learned cache
//! together. Parsing is synchronous and never fails; only persistence of
//! learned corrections is async.

use std::sync::Arc;

use ahash::AHashMap;
use chrono::{Local, NaiveDateTime};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::catalog::IntentCatalog;
use crate::chain;
use crate::config::ParserConfig;
use crate::entities::{extract_slots, EntityExtractor};
use crate::error::ParserError;
use crate::lang::LanguagePack;
use crate::learned::{LearnOutcome, LearnedPatterns, PatternStore};
use crate::matcher;
use crate::types::{
    ChainType, CommandChain, IntentDefinition, LearnedPattern, MatchSource, Params,
    ParsedCommand, TARGET_PARAM, USE_PREVIOUS_PARAM,
};

pub struct CommandParser {
    catalog: RwLock<IntentCatalog>,
    learned: LearnedPatterns,
    store: Option<Arc<dyn PatternStore>>,
    /// Serializes each user's store write and cache update
    corrections: Mutex<AHashMap<String, Arc<futures::lock::Mutex<()>>>>,
    extractor: EntityExtractor,
    config: ParserConfig,
}

impl CommandParser {
    /// Parser with the built-in intents and default thresholds
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Parser with the built-in intents plus the configured language packs
    pub fn with_config(config: ParserConfig) -> Self {
        let mut catalog = IntentCatalog::with_defaults();
        catalog.load_languages(&config.languages);

        Self {
            catalog: RwLock::new(catalog),
            learned: LearnedPatterns::new(config.max_learned_per_user),
            store: None,
            corrections: Mutex::new(AHashMap::new()),
            extractor: EntityExtractor::new(),
            config,
        }
    }

    /// Attach the collaborator learned corrections are persisted to
    pub fn with_store(mut self, store: Arc<dyn PatternStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one command, resolving dates against the local clock
    pub fn parse(&self, text: &str, user_id: Option<&str>) -> ParsedCommand {
        self.parse_at(text, user_id, Local::now().naive_local())
    }

    /// Parse one command, resolving dates against `now`
    pub fn parse_at(&self, text: &str, user_id: Option<&str>, now: NaiveDateTime) -> ParsedCommand {
        let text = text.trim();
        let mut result = ParsedCommand::new(text);
        if text.is_empty() {
            return result;
        }

        let normalized = text.to_lowercase();
        let thresholds = &self.config.thresholds;
        let catalog = self.catalog.read();

        let learned = user_id.and_then(|user| {
            self.learned.with_user(user, |patterns| {
                matcher::match_intent(&normalized, Some(patterns), &catalog, thresholds)
            })
        });
        let matched = match learned {
            Some(matched) => matched,
            None => matcher::match_intent(&normalized, None, &catalog, thresholds),
        };

        result.entities = self.extractor.extract_at(text, now);

        let Some(matched) = matched else {
            debug!(text, "no intent matched");
            return result;
        };

        result.params = match matched.source {
            MatchSource::Learned => matched.params.unwrap_or_default(),
            MatchSource::Phrase | MatchSource::Keyword => catalog
                .entry(&matched.intent)
                .map(|entry| extract_slots(text, entry))
                .unwrap_or_default(),
        };
        debug!(
            intent = %matched.intent,
            confidence = matched.confidence,
            source = ?matched.source,
            "matched intent"
        );
        result.intent = Some(matched.intent);
        result.confidence = matched.confidence;
        result
    }

    /// Parse text that may hold several chained commands
    pub fn parse_chain(&self, text: &str, user_id: Option<&str>) -> CommandChain {
        self.parse_chain_at(text, user_id, Local::now().naive_local())
    }

    pub fn parse_chain_at(
        &self,
        text: &str,
        user_id: Option<&str>,
        now: NaiveDateTime,
    ) -> CommandChain {
        let text = text.trim();
        let (segments, chain_type) = chain::split_chain(text);

        if segments.len() == 1 {
            return CommandChain::single(self.parse_at(text, user_id, now));
        }

        let last = segments.len() - 1;
        let commands: Vec<ParsedCommand> = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut command = self.parse_at(segment, user_id, now);
                if i < last {
                    command.chain_type = Some(chain_type);
                }

                if chain_type == ChainType::Pipe && i > 0 {
                    command.use_previous_output = true;
                    // "summarize it" and friends: nothing explicit to act on
                    let has_target = command.params.contains_key(TARGET_PARAM);
                    if !has_target && command.entities.urls.is_empty() {
                        command
                            .params
                            .insert(USE_PREVIOUS_PARAM.to_string(), "true".to_string());
                    }
                }
                command
            })
            .collect();

        debug!(count = commands.len(), chain_type = %chain_type, "parsed chain");
        CommandChain {
            commands,
            chain_type,
        }
    }

    pub fn is_chain(&self, text: &str) -> bool {
        chain::is_chain(text)
    }

    /// Insert or replace an intent. Takes effect for the next parse.
    pub fn register_intent(&self, definition: IntentDefinition) -> Result<(), ParserError> {
        self.catalog.write().register(definition)
    }

    pub fn register_phrases(&self, intent: &str, phrases: &[&str]) {
        self.catalog.write().register_phrases(intent, phrases);
    }

    pub fn merge_language(&self, code: &str, pack: &LanguagePack) -> bool {
        self.catalog.write().merge_language(code, pack)
    }

    pub fn load_language(&self, code: &str) -> bool {
        self.catalog.write().load_language(code)
    }

    pub fn load_languages<S: AsRef<str>>(&self, codes: &[S]) -> usize {
        self.catalog.write().load_languages(codes)
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        self.catalog.read().loaded_languages()
    }

    pub fn has_intent(&self, intent: &str) -> bool {
        self.catalog.read().contains(intent)
    }

    pub fn intent_names(&self) -> Vec<String> {
        self.catalog
            .read()
            .intent_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn examples(&self, intent: &str) -> Vec<String> {
        self.catalog.read().examples(intent).to_vec()
    }

    /// Seed a user's cache from the store. Returns how many patterns loaded.
    pub async fn load_user_patterns(&self, user_id: &str) -> Result<usize, ParserError> {
        let Some(store) = &self.store else {
            debug!(user_id, "no pattern store configured");
            return Ok(0);
        };

        let patterns = store.load_user_patterns(user_id).await?;
        let count = patterns.len();
        self.learned.replace(user_id, patterns);
        Ok(count)
    }

    /// Remember that `phrase` meant `intent` for this user.
    ///
    /// The store is written first; the cache only changes once it accepted
    /// the correction. Corrections from the same user are applied one at a
    /// time, so the store and the cache see them in the same order.
    pub async fn learn_correction(
        &self,
        user_id: &str,
        phrase: &str,
        intent: &str,
        params: Option<Params>,
    ) -> Result<LearnOutcome, ParserError> {
        let lock = self
            .corrections
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        match &self.store {
            Some(store) => {
                store
                    .save_pattern(user_id, phrase, intent, params.as_ref())
                    .await?
            }
            None => warn!(user_id, "no pattern store configured; correction kept in memory only"),
        }

        if !self.has_intent(intent) {
            debug!(intent, "learned correction names an unregistered intent");
        }

        Ok(self.learned.learn(user_id, phrase, intent, params))
    }

    /// Copy of a user's cached corrections
    pub fn learned_patterns(&self, user_id: &str) -> Vec<LearnedPattern> {
        self.learned.patterns(user_id)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
