//! Text normalization: cache keys and token sequences.
//!
//! The cache key is a SHA-256 digest of the raw content, so it never depends
//! on how the tokenizer segments the text. Tokens come from the cleaned text
//! (HTML tags and URLs removed, whitespace collapsed).

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::capability::{TokenSequence, Tokenizer};
use crate::error::{AnalysisError, Result};

/// Cache key derived from raw review content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Hashes raw content into a key.
    pub fn from_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of normalization.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub key: NormalizedKey,
    pub tokens: TokenSequence,
}

/// Turns raw review text into a cache key and a token sequence.
pub struct Normalizer {
    tokenizer: Arc<dyn Tokenizer>,
    html_tag: Regex,
    url: Regex,
    whitespace: Regex,
}

impl Normalizer {
    /// Creates a normalizer over the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            html_tag: Regex::new(r"<[^>]*>").expect("Invalid regex pattern"),
            url: Regex::new(r"https?://\S+|www\.\S+").expect("Invalid regex pattern"),
            whitespace: Regex::new(r"\s+").expect("Invalid regex pattern"),
        }
    }

    /// Validates, keys, and tokenizes the text.
    ///
    /// Blank text is rejected with `InvalidInput`. Tokenizer failures surface
    /// as `ScoringUnavailable`.
    pub fn normalize(&self, text: &str) -> Result<Normalized> {
        let key = self.key(text)?;
        let tokens = self.tokens(text)?;
        Ok(Normalized { key, tokens })
    }

    /// Validates the text and derives its cache key, without tokenizing.
    pub fn key(&self, text: &str) -> Result<NormalizedKey> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }
        Ok(NormalizedKey::from_text(text))
    }

    /// Cleans and tokenizes the text.
    pub fn tokens(&self, text: &str) -> Result<TokenSequence> {
        let cleaned = self.clean(text);
        Ok(self.tokenizer.tokenize(&cleaned)?)
    }

    /// Strips markup and links and collapses whitespace.
    pub fn clean(&self, text: &str) -> String {
        let text = self.html_tag.replace_all(text, "");
        let text = self.url.replace_all(&text, "");
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    /// Name of the underlying tokenizer.
    pub fn tokenizer_name(&self) -> &'static str {
        self.tokenizer.name()
    }
}
