//! Content appropriateness filter.
//!
//! Checks raw review text against literal sensitive terms and regex patterns.
//! Reasons are reported in evaluation order: term reasons first (term order),
//! then pattern reasons (pattern order), then the optional length reason.

mod word_set;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::ResultCache;
use crate::normalizer::NormalizedKey;

pub use word_set::SensitiveWordSet;

/// Reason prefix for a literal term match.
pub const SENSITIVE_WORD_REASON: &str = "sensitive_word";
/// Reason prefix for a pattern match.
pub const PATTERN_REASON: &str = "pattern";
/// Reason for content below the minimum length.
pub const TOO_SHORT_REASON: &str = "too_short";

/// Appropriateness verdict for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub is_appropriate: bool,
    /// Empty when appropriate. Not deduplicated.
    pub reasons: Vec<String>,
}

impl FilterVerdict {
    /// Creates a verdict from reasons; appropriate iff there are none.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            is_appropriate: reasons.is_empty(),
            reasons,
        }
    }
}

/// Cache-first content filter.
pub struct ContentFilter {
    words: SensitiveWordSet,
    min_content_chars: Option<usize>,
    cache: ResultCache<FilterVerdict>,
}

impl ContentFilter {
    /// Creates a filter over a loaded word set.
    pub fn new(words: SensitiveWordSet) -> Self {
        Self {
            words,
            min_content_chars: None,
            cache: ResultCache::new(),
        }
    }

    /// Flags content shorter than `chars` characters.
    pub fn with_min_content_chars(mut self, chars: Option<usize>) -> Self {
        self.min_content_chars = chars;
        self
    }

    /// Returns the verdict for `text`, consulting the cache first.
    pub fn filter(&self, key: &NormalizedKey, text: &str) -> FilterVerdict {
        if let Some(verdict) = self.cache.get(key) {
            debug!(key = %key, "Filter cache hit");
            return verdict;
        }

        let verdict = self.check(text);
        debug!(
            key = %key,
            is_appropriate = verdict.is_appropriate,
            reasons = verdict.reasons.len(),
            "Filtered content"
        );

        self.cache.put(key.clone(), verdict.clone());
        verdict
    }

    /// Evaluates every check without touching the cache.
    pub fn check(&self, text: &str) -> FilterVerdict {
        let mut reasons: Vec<String> = self
            .words
            .matching_terms(text)
            .map(|term| format!("{}:{}", SENSITIVE_WORD_REASON, term))
            .collect();

        reasons.extend(
            self.words
                .matching_patterns(text)
                .map(|name| format!("{}:{}", PATTERN_REASON, name)),
        );

        if let Some(min) = self.min_content_chars {
            if text.chars().count() < min {
                reasons.push(TOO_SHORT_REASON.to_string());
            }
        }

        FilterVerdict::from_reasons(reasons)
    }

    /// The loaded word set.
    pub fn words(&self) -> &SensitiveWordSet {
        &self.words
    }

    /// Number of cached verdicts.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Clears cached verdicts and returns how many were dropped.
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}
