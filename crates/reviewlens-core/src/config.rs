//! Analyzer configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Default confidence threshold for accepting a binary prediction.
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Default directory holding `model.onnx` and `tokenizer.json`.
pub const DEFAULT_MODEL_PATH: &str = "models";

/// Immutable configuration passed to the analyzer at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum confidence for a positive/negative label, in (0.5, 1.0].
    pub threshold: f32,
    /// JSON word list. `None` uses the built-in set.
    pub sensitive_words_path: Option<PathBuf>,
    /// Directory of the ONNX sentiment model.
    pub model_path: PathBuf,
    /// Flag content shorter than this many characters (disabled when `None`).
    pub min_content_chars: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            sensitive_words_path: None,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            min_content_chars: None,
        }
    }
}

impl AnalyzerConfig {
    /// Sets the confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the sensitive-word file.
    pub fn with_sensitive_words_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sensitive_words_path = Some(path.into());
        self
    }

    /// Sets the model directory.
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Enables the minimum-length check.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = Some(chars);
        self
    }

    /// Checks that the threshold lies in (0.5, 1.0].
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.threshold > 0.5 && self.threshold <= 1.0 {
            Ok(())
        } else {
            Err(SetupError::InvalidThreshold(self.threshold))
        }
    }
}
