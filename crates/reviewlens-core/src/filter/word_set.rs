//! Sensitive-word resource: literal terms plus named patterns.
//!
//! Loaded once at startup and read-only afterwards. The file is JSON:
//!
//! ```json
//! {
//!   "case_sensitive": false,
//!   "words": ["赌博", "诈骗"],
//!   "patterns": [
//!     "\\d{17}[0-9X]",
//!     { "name": "url", "pattern": "https?://\\S+" }
//!   ]
//! }
//! ```
//!
//! An unnamed pattern is reported under its own source text.

use std::path::Path;

use regex::{Regex, RegexSet};
use serde::Deserialize;

use crate::error::WordListError;

#[derive(Debug, Deserialize)]
struct WordListFile {
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default)]
    words: Vec<String>,
    #[serde(default)]
    patterns: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternEntry {
    Source(String),
    Named { name: String, pattern: String },
}

impl PatternEntry {
    fn into_parts(self) -> (String, String) {
        match self {
            PatternEntry::Source(pattern) => (pattern.clone(), pattern),
            PatternEntry::Named { name, pattern } => (name, pattern),
        }
    }
}

/// Immutable set of sensitive terms and patterns.
#[derive(Debug)]
pub struct SensitiveWordSet {
    /// Terms as configured, in load order, without duplicates.
    terms: Vec<String>,
    /// Terms as matched (lowercased unless case-sensitive).
    needles: Vec<String>,
    case_sensitive: bool,
    pattern_names: Vec<String>,
    /// Regex set for evaluating every pattern in one pass.
    pattern_set: RegexSet,
}

impl SensitiveWordSet {
    /// Builds a word set from terms and `(name, pattern)` pairs.
    ///
    /// Blank terms are skipped and repeated terms keep their first position.
    pub fn new<T, P, N, S>(
        terms: T,
        patterns: P,
        case_sensitive: bool,
    ) -> Result<Self, WordListError>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        P: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut unique = Vec::new();
        for term in terms {
            let term: String = term.into();
            let term = term.trim().to_string();
            if !term.is_empty() && !unique.contains(&term) {
                unique.push(term);
            }
        }

        let needles = unique
            .iter()
            .map(|t| {
                if case_sensitive {
                    t.clone()
                } else {
                    t.to_lowercase()
                }
            })
            .collect();

        let mut pattern_names = Vec::new();
        let mut sources = Vec::new();
        for (name, source) in patterns {
            let source: String = source.into();
            Regex::new(&source).map_err(|e| WordListError::InvalidPattern {
                pattern: source.clone(),
                source: e,
            })?;
            pattern_names.push(name.into());
            sources.push(source);
        }
        let pattern_set = RegexSet::new(&sources).map_err(|e| WordListError::InvalidPattern {
            pattern: sources.join(" | "),
            source: e,
        })?;

        Ok(Self {
            terms: unique,
            needles,
            case_sensitive,
            pattern_names,
            pattern_set,
        })
    }

    /// Loads a word set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordListError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses a word set from JSON text.
    pub fn from_json(json: &str) -> Result<Self, WordListError> {
        let file: WordListFile = serde_json::from_str(json)?;
        let patterns = file.patterns.into_iter().map(PatternEntry::into_parts);
        Self::new(file.words, patterns, file.case_sensitive)
    }

    /// The built-in set used when no word file is configured.
    pub fn builtin() -> Self {
        let terms = ["脏话", "骂人", "违禁品", "色情", "赌博", "诈骗"];
        let patterns = [
            ("personal_info", r"1[3-9]\d{9}|身份证|\d{18}|\d{17}X"),
            ("url", r"https?://\S+|www\.\S+"),
            ("email", r"\S+@\S+\.\S+"),
        ];
        Self::new(terms, patterns, false).expect("Invalid built-in patterns")
    }

    /// Terms that occur in the text, in term order.
    pub fn matching_terms<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a str> + 'a {
        let haystack = if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };
        self.terms
            .iter()
            .zip(&self.needles)
            .filter(move |(_, needle)| haystack.contains(needle.as_str()))
            .map(|(term, _)| term.as_str())
    }

    /// Names of patterns that match the text, in pattern order.
    ///
    /// Every pattern is evaluated; there is no early exit.
    pub fn matching_patterns<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern_set
            .matches(text)
            .into_iter()
            .map(|i| self.pattern_names[i].as_str())
    }

    /// Number of literal terms.
    pub fn words_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of patterns.
    pub fn patterns_count(&self) -> usize {
        self.pattern_names.len()
    }

    /// Whether term matching is case-sensitive.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}
