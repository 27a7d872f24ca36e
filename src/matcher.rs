//! Intent matcher - ordered strategies over the catalog
//!
//! Learned corrections are tried first, then phrase variations, then
//! keywords and regexes. Each stage short-circuits the ones after it.
//! Within a stage the highest score wins and earlier-registered intents win
//! ties, because a candidate only replaces the current best on a strictly
//! greater score.

use tracing::debug;

use crate::catalog::IntentCatalog;
use crate::config::Thresholds;
use crate::similarity::{partial_ratio, ratio};
use crate::types::{IntentMatch, LearnedPattern, MatchSource};

/// Running best candidate for a stage
struct Best<'a> {
    intent: Option<&'a str>,
    score: f64,
}

impl<'a> Best<'a> {
    fn new() -> Self {
        Self {
            intent: None,
            score: 0.0,
        }
    }

    fn offer(&mut self, intent: &'a str, score: f64) {
        if score > self.score {
            self.score = score;
            self.intent = Some(intent);
        }
    }

    fn accept(self, floor: f64, source: MatchSource) -> Option<IntentMatch> {
        match self.intent {
            Some(intent) if self.score >= floor => {
                Some(IntentMatch::new(intent, self.score, source))
            }
            _ => None,
        }
    }
}

/// Match normalized text against one user's learned corrections.
///
/// Patterns naming an intent the catalog no longer holds are skipped.
pub fn match_learned(
    text: &str,
    patterns: &[LearnedPattern],
    catalog: &IntentCatalog,
    thresholds: &Thresholds,
) -> Option<IntentMatch> {
    let mut best: Option<(&LearnedPattern, f64)> = None;

    for pattern in patterns {
        if !catalog.contains(&pattern.intent) {
            debug!(intent = %pattern.intent, "skipping stale learned pattern");
            continue;
        }

        if pattern.phrase == text {
            return Some(learned_match(pattern, thresholds));
        }

        let score = ratio(&pattern.phrase, text);
        if score > thresholds.learned_fuzzy_floor && best.map_or(true, |(_, b)| score > b) {
            best = Some((pattern, score));
        }
    }

    best.map(|(pattern, _)| learned_match(pattern, thresholds))
}

fn learned_match(pattern: &LearnedPattern, thresholds: &Thresholds) -> IntentMatch {
    let mut matched = IntentMatch::new(
        pattern.intent.clone(),
        thresholds.learned_exact,
        MatchSource::Learned,
    );
    matched.params = pattern.params.clone();
    matched
}

/// Match normalized text against the phrase-variation table
pub fn match_phrases(
    text: &str,
    catalog: &IntentCatalog,
    thresholds: &Thresholds,
) -> Option<IntentMatch> {
    let mut best = Best::new();

    for (intent, phrases) in catalog.phrase_table() {
        if !catalog.contains(intent) {
            continue;
        }

        for phrase in phrases {
            if text.contains(phrase.text.as_str()) {
                best.offer(intent, thresholds.phrase_contains);
                continue;
            }

            let score = partial_ratio(&phrase.text, text);
            if score > thresholds.phrase_fuzzy_floor {
                best.offer(intent, score);
            }
        }
    }

    best.accept(thresholds.phrase_fuzzy_floor, MatchSource::Phrase)
}

/// Match normalized text against intent keywords and regex patterns.
///
/// Results under the acceptance floor are discarded.
pub fn match_keywords(
    text: &str,
    catalog: &IntentCatalog,
    thresholds: &Thresholds,
) -> Option<IntentMatch> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut best = Best::new();

    for entry in catalog.entries() {
        let intent = entry.definition.name.as_str();

        for keyword in &entry.definition.keywords {
            if text.contains(keyword.text.as_str()) {
                best.offer(intent, thresholds.keyword_contains);
                continue;
            }

            for word in &words {
                let score = ratio(&keyword.text, word);
                if score > thresholds.keyword_fuzzy_floor {
                    best.offer(intent, score);
                }
            }
        }

        if entry.regexes.iter().any(|re| re.is_match(text)) {
            best.offer(intent, thresholds.regex_match);
        }
    }

    best.accept(thresholds.acceptance_floor, MatchSource::Keyword)
}

/// Full pipeline over normalized text.
///
/// `learned` is the user's correction list when a user id was given.
pub fn match_intent(
    text: &str,
    learned: Option<&[LearnedPattern]>,
    catalog: &IntentCatalog,
    thresholds: &Thresholds,
) -> Option<IntentMatch> {
    if text.is_empty() {
        return None;
    }

    if let Some(patterns) = learned.filter(|p| !p.is_empty()) {
        if let Some(found) = match_learned(text, patterns, catalog, thresholds) {
            debug!(intent = %found.intent, "matched learned pattern");
            return Some(found);
        }
    }

    match_phrases(text, catalog, thresholds)
        .or_else(|| match_keywords(text, catalog, thresholds))
}
