//! Chain detection and splitting
//!
//! Delimiters are tried most specific first. Pipes (`|`, `->`) feed one
//! stage's output into the next; ` and then `, ` then ` and `;` run stages
//! independently. All delimiters match case-insensitively.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::types::ChainType;

/// A delimiter and the chain type it produces
pub struct ChainRule {
    pub delimiter: Regex,
    pub chain_type: ChainType,
}

static RULES: Lazy<Vec<ChainRule>> = Lazy::new(|| {
    [
        (r"\s*\|\s*", ChainType::Pipe),
        (r"\s*->\s*", ChainType::Pipe),
        (r"\s+and\s+then\s+", ChainType::Sequence),
        (r"\s+then\s+", ChainType::Sequence),
        (r"\s*;\s*", ChainType::Sequence),
    ]
    .into_iter()
    .map(|(pattern, chain_type)| ChainRule {
        delimiter: RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("Invalid chain delimiter"),
        chain_type,
    })
    .collect()
});

/// Delimiter rules in priority order
pub fn rules() -> &'static [ChainRule] {
    &RULES
}

/// Whether the text splits into more than one command
pub fn is_chain(text: &str) -> bool {
    split_chain(text).0.len() > 1
}

/// Split text on the first delimiter rule yielding two or more non-empty
/// segments. Without one, the trimmed text comes back alone as `Single`.
pub fn split_chain(text: &str) -> (Vec<String>, ChainType) {
    for rule in rules() {
        if !rule.delimiter.is_match(text) {
            continue;
        }

        let segments: Vec<String> = rule
            .delimiter
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if segments.len() >= 2 {
            return (segments, rule.chain_type);
        }
    }

    (vec![text.trim().to_string()], ChainType::Single)
}
