//! Deterministic capabilities for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::capability::{Polarity, Prediction, SentimentModel, TokenSequence};
use crate::error::CapabilityError;

/// Model returning a scripted prediction and counting calls.
pub struct MockModel {
    prediction: Mutex<Result<Prediction, CapabilityError>>,
    calls: AtomicUsize,
    /// Inputs containing this piece fail with an inference error.
    poison: Option<String>,
}

impl MockModel {
    pub fn returning(polarity: Polarity, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            prediction: Mutex::new(Ok(Prediction::new(polarity, confidence))),
            calls: AtomicUsize::new(0),
            poison: None,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            prediction: Mutex::new(Err(CapabilityError::Inference("model offline".into()))),
            calls: AtomicUsize::new(0),
            poison: None,
        })
    }

    /// Succeeds except for inputs containing `piece`.
    pub fn failing_on(polarity: Polarity, confidence: f32, piece: &str) -> Arc<Self> {
        Arc::new(Self {
            prediction: Mutex::new(Ok(Prediction::new(polarity, confidence))),
            calls: AtomicUsize::new(0),
            poison: Some(piece.to_string()),
        })
    }

    pub fn set_prediction(&self, polarity: Polarity, confidence: f32) {
        *self.prediction.lock() = Ok(Prediction::new(polarity, confidence));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentModel for MockModel {
    fn classify(&self, tokens: &TokenSequence) -> Result<Prediction, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(poison) = &self.poison {
            if tokens.pieces.iter().any(|p| p == poison) {
                return Err(CapabilityError::Inference(format!("cannot score {poison}")));
            }
        }
        self.prediction.lock().clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
