//! Error types for review analysis.

use thiserror::Error;

/// Errors reported while analyzing a single review or a batch.
///
/// Item-level variants (`InvalidInput`, `ScoringUnavailable`) are isolated per
/// item inside a batch. Batch-level variants (`EmptyBatch`, `BatchTooLarge`)
/// reject the whole request before any item is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Blank content or otherwise malformed item.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Batch contained no items.
    #[error("batch must contain at least one review")]
    EmptyBatch,

    /// Batch exceeded the maximum item count.
    #[error("batch of {len} reviews exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// The tokenizer or sentiment model failed.
    #[error("sentiment scoring unavailable: {0}")]
    ScoringUnavailable(String),
}

impl AnalysisError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::EmptyBatch => "empty_batch",
            AnalysisError::BatchTooLarge { .. } => "batch_too_large",
            AnalysisError::ScoringUnavailable(_) => "scoring_unavailable",
        }
    }
}

impl From<CapabilityError> for AnalysisError {
    fn from(e: CapabilityError) -> Self {
        AnalysisError::ScoringUnavailable(e.to_string())
    }
}

/// Failure reported by an injected tokenizer or sentiment model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    /// Tokenization failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Model inference failed.
    #[error("inference error: {0}")]
    Inference(String),
}

/// Errors loading the sensitive-word resource.
#[derive(Debug, Error)]
pub enum WordListError {
    /// Word file could not be read.
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    /// Word file is not valid JSON of the expected shape.
    #[error("failed to parse word list: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured pattern does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that prevent the analyzer from being constructed.
///
/// These are fatal at startup and never reported per request.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Confidence threshold outside (0.5, 1.0].
    #[error("threshold must be in (0.5, 1.0], got {0}")]
    InvalidThreshold(f32),

    /// Sensitive-word resource failed to load.
    #[error("content filter unavailable: {0}")]
    FilterUnavailable(#[from] WordListError),

    /// Sentiment model or tokenizer failed to load.
    #[error("sentiment model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
