//! Vocabulary-free tokenizer for mixed CJK and Latin text.

use regex::Regex;

use super::{TokenSequence, Tokenizer};
use crate::error::CapabilityError;

/// Each Han ideograph is its own token; other letter/digit runs form words.
const TOKEN_PATTERN: &str = r"\p{Han}|[\p{L}\p{N}&&[^\p{Han}]]+";

/// Regex-based tokenizer.
///
/// Emits lowercase pieces. Punctuation and whitespace are dropped.
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    /// Creates a new tokenizer.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TOKEN_PATTERN).expect("Invalid token pattern"),
        }
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenSequence, CapabilityError> {
        let pieces = self
            .pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        Ok(TokenSequence::from_pieces(pieces))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
