//! ReviewLens Core - Sentiment scoring and content filtering for reviews.
//!
//! This crate provides the analysis pipeline behind the ReviewLens service:
//!
//! - [`Normalizer`] validates review text and derives a content cache key
//! - [`SentimentScorer`] maps model predictions to positive, neutral, or negative
//! - [`ContentFilter`] flags sensitive terms and patterns
//! - [`BatchCoordinator`] runs up to [`MAX_BATCH_SIZE`] reviews in order
//! - [`ReviewAnalyzer`] ties them together behind one facade
//!
//! The tokenizer and sentiment model are injected through the [`Tokenizer`]
//! and [`SentimentModel`] traits. A lexicon model is always available; the
//! ONNX model requires the `ml` feature.
//!
//! ## Example
//!
//! ```
//! use reviewlens_core::{AnalyzerConfig, ReviewAnalyzer};
//!
//! let analyzer = ReviewAnalyzer::with_lexicon(&AnalyzerConfig::default()).unwrap();
//! let result = analyzer.analyze_one(1, "这个产品非常好用，我很喜欢！").unwrap();
//! assert!(result.is_appropriate);
//! ```

pub mod analyzer;
pub mod batch;
pub mod cache;
pub mod capability;
pub mod config;
pub mod error;
pub mod filter;
pub mod normalizer;
pub mod scorer;

#[cfg(test)]
mod testing;

pub use analyzer::{CacheClearReport, FilterHealth, HealthSnapshot, ReviewAnalyzer, SentimentHealth};
pub use batch::{
    AnalysisResult, BatchCoordinator, BatchEntry, BatchResult, ItemAnalyzer, ItemFailure,
    ItemOutcome, ReviewItem, MAX_BATCH_SIZE,
};
pub use cache::ResultCache;
pub use capability::{
    LexiconModel, OnnxModelConfig, OnnxSentimentModel, Polarity, Prediction, RegexTokenizer,
    SentimentModel, TokenSequence, Tokenizer,
};
pub use config::{AnalyzerConfig, DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD};
pub use error::{AnalysisError, CapabilityError, Result, SetupError, WordListError};
pub use filter::{ContentFilter, FilterVerdict, SensitiveWordSet};
pub use normalizer::{Normalized, NormalizedKey, Normalizer};
pub use scorer::{SentimentLabel, SentimentScorer, SentimentVerdict};
