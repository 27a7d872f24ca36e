//! Per-user learned corrections
//!
//! The in-memory cache is consulted before any other matching strategy.
//! Each user's list sits behind its own mutex, so corrections from one user
//! never wait on another and a reader never sees a half-updated entry.

use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::types::{normalize, LearnedPattern, Params};

/// Durable home of learned corrections
#[async_trait]
pub trait PatternStore: Send + Sync {
    /// All patterns recorded for a user, oldest first
    async fn load_user_patterns(&self, user_id: &str) -> Result<Vec<LearnedPattern>, StoreError>;

    /// Record a correction. Re-saving a phrase replaces its intent and params.
    async fn save_pattern(
        &self,
        user_id: &str,
        phrase: &str,
        intent: &str,
        params: Option<&Params>,
    ) -> Result<(), StoreError>;
}

/// Process-local store used for tests and single-process hosts
#[derive(Default)]
pub struct InMemoryPatternStore {
    patterns: Mutex<AHashMap<String, Vec<LearnedPattern>>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one user's patterns
    pub fn with_patterns(user_id: &str, patterns: Vec<LearnedPattern>) -> Self {
        let store = Self::new();
        store.patterns.lock().insert(user_id.to_string(), patterns);
        store
    }
}

#[async_trait]
impl PatternStore for InMemoryPatternStore {
    async fn load_user_patterns(&self, user_id: &str) -> Result<Vec<LearnedPattern>, StoreError> {
        Ok(self
            .patterns
            .lock()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_pattern(
        &self,
        user_id: &str,
        phrase: &str,
        intent: &str,
        params: Option<&Params>,
    ) -> Result<(), StoreError> {
        let mut patterns = self.patterns.lock();
        upsert(
            patterns.entry(user_id.to_string()).or_default(),
            phrase,
            intent,
            params.cloned(),
        );
        Ok(())
    }
}

/// Whether a correction created a new entry or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    Added,
    Updated,
}

type UserPatterns = Arc<Mutex<Vec<LearnedPattern>>>;

/// In-memory learned-pattern cache keyed by user id
pub struct LearnedPatterns {
    users: RwLock<AHashMap<String, UserPatterns>>,
    max_per_user: Option<usize>,
}

impl LearnedPatterns {
    /// `max_per_user` caps each user's list; `None` keeps everything
    pub fn new(max_per_user: Option<usize>) -> Self {
        Self {
            users: RwLock::new(AHashMap::new()),
            max_per_user,
        }
    }

    pub fn is_loaded(&self, user_id: &str) -> bool {
        self.users.read().contains_key(user_id)
    }

    /// Replace a user's cached list, typically with what the store returned
    pub fn replace(&self, user_id: &str, mut patterns: Vec<LearnedPattern>) {
        for pattern in &mut patterns {
            pattern.phrase = normalize(&pattern.phrase);
        }
        if let Some(max) = self.max_per_user {
            while patterns.len() > max {
                let candidates = patterns.len();
                evict_one(&mut patterns, candidates);
            }
        }
        debug!(user_id, count = patterns.len(), "loaded learned patterns");
        *self.slot(user_id).lock() = patterns;
    }

    /// Record a correction in the cache.
    ///
    /// An existing phrase gets its intent and params overwritten and its
    /// use count bumped; a new phrase is appended with a use count of one.
    pub fn learn(
        &self,
        user_id: &str,
        phrase: &str,
        intent: &str,
        params: Option<Params>,
    ) -> LearnOutcome {
        let slot = self.slot(user_id);
        let mut patterns = slot.lock();
        let outcome = upsert(&mut patterns, phrase, intent, params);

        if let Some(max) = self.max_per_user {
            if patterns.len() > max {
                // The entry just learned is never the one evicted
                let candidates = patterns.len() - 1;
                evict_one(&mut patterns, candidates);
            }
        }

        info!(user_id, phrase = %normalize(phrase), intent, ?outcome, "learned correction");
        outcome
    }

    /// Run `f` over a user's patterns under that user's lock
    pub fn with_user<R>(&self, user_id: &str, f: impl FnOnce(&[LearnedPattern]) -> R) -> Option<R> {
        let slot = self.users.read().get(user_id).cloned()?;
        let patterns = slot.lock();
        Some(f(patterns.as_slice()))
    }

    /// Copy of a user's patterns
    pub fn patterns(&self, user_id: &str) -> Vec<LearnedPattern> {
        self.with_user(user_id, |p| p.to_vec()).unwrap_or_default()
    }

    /// Drop a user's cached list at session end
    pub fn forget_user(&self, user_id: &str) -> bool {
        self.users.write().remove(user_id).is_some()
    }

    fn slot(&self, user_id: &str) -> UserPatterns {
        if let Some(slot) = self.users.read().get(user_id) {
            return slot.clone();
        }
        self.users
            .write()
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }
}

impl Default for LearnedPatterns {
    fn default() -> Self {
        Self::new(None)
    }
}

fn upsert(
    patterns: &mut Vec<LearnedPattern>,
    phrase: &str,
    intent: &str,
    params: Option<Params>,
) -> LearnOutcome {
    let phrase = normalize(phrase);
    match patterns.iter_mut().find(|p| p.phrase == phrase) {
        Some(existing) => {
            existing.intent = intent.to_string();
            existing.params = params;
            existing.use_count += 1;
            LearnOutcome::Updated
        }
        None => {
            patterns.push(LearnedPattern::new(&phrase, intent, params));
            LearnOutcome::Added
        }
    }
}

/// Remove the least-used entry among the first `candidates`, oldest first on ties
fn evict_one(patterns: &mut Vec<LearnedPattern>, candidates: usize) {
    let victim = patterns
        .iter()
        .take(candidates)
        .enumerate()
        .min_by_key(|(i, p)| (p.use_count, *i))
        .map(|(i, _)| i);

    if let Some(i) = victim {
        let evicted = patterns.remove(i);
        debug!(phrase = %evicted.phrase, use_count = evicted.use_count, "evicted learned pattern");
    }
}
