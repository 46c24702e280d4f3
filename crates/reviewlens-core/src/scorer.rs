//! Sentiment scoring with confidence-threshold labeling.
//!
//! The underlying model is binary. Predictions whose confidence falls below
//! the threshold are labeled neutral instead of forcing every review into
//! positive or negative.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ResultCache;
use crate::capability::{Polarity, Prediction, SentimentModel, TokenSequence};
use crate::error::{AnalysisError, Result, SetupError};
use crate::normalizer::NormalizedKey;

/// Final three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Returns the label as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    /// Applies the threshold to a binary prediction.
    ///
    /// Confidence equal to the threshold keeps the predicted class.
    pub fn from_prediction(prediction: &Prediction, threshold: f32) -> Self {
        if prediction.confidence < threshold {
            return SentimentLabel::Neutral;
        }
        match prediction.polarity {
            Polarity::Positive => SentimentLabel::Positive,
            Polarity::Negative => SentimentLabel::Negative,
        }
    }
}

/// Sentiment verdict for one piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub label: SentimentLabel,
    /// The model's confidence in its predicted class, not in `label`.
    pub score: f32,
}

/// Cache-first sentiment scorer.
pub struct SentimentScorer {
    model: Arc<dyn SentimentModel>,
    threshold: f32,
    cache: ResultCache<SentimentVerdict>,
}

impl SentimentScorer {
    /// Creates a scorer. The threshold must lie in (0.5, 1.0].
    pub fn new(
        model: Arc<dyn SentimentModel>,
        threshold: f32,
    ) -> std::result::Result<Self, SetupError> {
        if !(threshold > 0.5 && threshold <= 1.0) {
            return Err(SetupError::InvalidThreshold(threshold));
        }
        Ok(Self {
            model,
            threshold,
            cache: ResultCache::new(),
        })
    }

    /// Scores tokens, consulting the cache first.
    ///
    /// Model failures are returned as `ScoringUnavailable` and nothing is cached.
    pub fn score(&self, key: &NormalizedKey, tokens: &TokenSequence) -> Result<SentimentVerdict> {
        if let Some(verdict) = self.cache.get(key) {
            debug!(key = %key, "Sentiment cache hit");
            return Ok(verdict);
        }

        let prediction = self.model.classify(tokens).map_err(|e| {
            warn!(model = self.model.name(), error = %e, "Sentiment model failed");
            AnalysisError::from(e)
        })?;

        if !(0.0..=1.0).contains(&prediction.confidence) {
            warn!(
                model = self.model.name(),
                confidence = prediction.confidence,
                "Sentiment model returned confidence outside [0, 1]"
            );
            return Err(AnalysisError::ScoringUnavailable(format!(
                "model returned invalid confidence {}",
                prediction.confidence
            )));
        }

        let verdict = SentimentVerdict {
            label: SentimentLabel::from_prediction(&prediction, self.threshold),
            score: prediction.confidence,
        };
        debug!(
            key = %key,
            polarity = ?prediction.polarity,
            confidence = prediction.confidence,
            label = verdict.label.as_str(),
            "Scored sentiment"
        );

        self.cache.put(key.clone(), verdict);
        Ok(verdict)
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
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
