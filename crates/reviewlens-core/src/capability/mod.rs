//! Pluggable tokenization and sentiment-model capabilities.
//!
//! The analyzer treats both as opaque: a [`Tokenizer`] turns cleaned text into
//! a [`TokenSequence`], and a [`SentimentModel`] turns that sequence into a
//! binary [`Prediction`]. Implementations must be shareable across threads.

mod lexicon;
mod onnx;
mod tokenizer;

use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

pub use lexicon::LexiconModel;
pub use onnx::{OnnxModelConfig, OnnxSentimentModel};
pub use tokenizer::RegexTokenizer;

/// Token sequence produced by a tokenizer.
///
/// `ids` is empty for tokenizers without a vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence {
    pub pieces: Vec<String>,
    pub ids: Vec<u32>,
}

impl TokenSequence {
    /// Creates a sequence of text pieces without vocabulary ids.
    pub fn from_pieces(pieces: Vec<String>) -> Self {
        Self {
            pieces,
            ids: Vec::new(),
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.pieces.len().max(self.ids.len())
    }

    /// Returns true if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Class predicted by a binary sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Raw model output: predicted class and the model's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub polarity: Polarity,
    /// Confidence in `polarity`, in [0, 1].
    pub confidence: f32,
}

impl Prediction {
    /// Creates a prediction.
    pub fn new(polarity: Polarity, confidence: f32) -> Self {
        Self {
            polarity,
            confidence,
        }
    }

    /// Builds a prediction from a two-class probability pair.
    pub fn from_probabilities(negative: f32, positive: f32) -> Self {
        if positive >= negative {
            Self::new(Polarity::Positive, positive)
        } else {
            Self::new(Polarity::Negative, negative)
        }
    }
}

/// Splits text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenizes the given text. Segmentation need not be deterministic.
    fn tokenize(&self, text: &str) -> Result<TokenSequence, CapabilityError>;

    /// Returns the name of this tokenizer for logging.
    fn name(&self) -> &'static str;
}

/// Binary sentiment classifier.
pub trait SentimentModel: Send + Sync {
    /// Classifies a token sequence. Stateless per call.
    fn classify(&self, tokens: &TokenSequence) -> Result<Prediction, CapabilityError>;

    /// Returns the name of this model for logging.
    fn name(&self) -> &'static str;
}
