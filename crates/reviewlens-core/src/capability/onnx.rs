//! ONNX sentiment model.
//!
//! Runs a binary sequence-classification model (e.g. a RoBERTa fine-tuned on
//! product reviews) exported to ONNX. Logit index 0 is negative, index 1 is
//! positive. The same instance serves as tokenizer and model, since the
//! model's vocabulary must match its tokenizer.

use std::path::{Path, PathBuf};

#[cfg(feature = "ml")]
use parking_lot::Mutex;

use super::{Prediction, SentimentModel, TokenSequence, Tokenizer};
use crate::error::{CapabilityError, SetupError};

/// Configuration for the ONNX sentiment model.
#[derive(Debug, Clone)]
pub struct OnnxModelConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Path to the tokenizer.json file.
    pub tokenizer_path: PathBuf,
    /// Maximum sequence length (tokens).
    pub max_length: usize,
    /// Whether the model expects a `token_type_ids` input.
    pub token_type_ids: bool,
}

impl OnnxModelConfig {
    /// Config for a model directory containing `model.onnx` and `tokenizer.json`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join("model.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
            max_length: 512,
            token_type_ids: false,
        }
    }
}

impl Default for OnnxModelConfig {
    fn default() -> Self {
        Self::from_dir("models")
    }
}

/// Sentiment model backed by ONNX Runtime.
#[cfg(feature = "ml")]
pub struct OnnxSentimentModel {
    session: Mutex<ort::session::Session>,
    tokenizer: tokenizers::Tokenizer,
    config: OnnxModelConfig,
}

#[cfg(feature = "ml")]
impl OnnxSentimentModel {
    /// Loads the model and tokenizer.
    ///
    /// Returns an error if either file is missing or fails to load.
    pub fn load(config: OnnxModelConfig) -> Result<Self, SetupError> {
        if !config.model_path.exists() {
            return Err(SetupError::ModelUnavailable(format!(
                "model file not found: {}",
                config.model_path.display()
            )));
        }
        if !config.tokenizer_path.exists() {
            return Err(SetupError::ModelUnavailable(format!(
                "tokenizer file not found: {}",
                config.tokenizer_path.display()
            )));
        }

        let session = build_session(&config.model_path)
            .map_err(|e| SetupError::ModelUnavailable(format!("ONNX runtime error: {}", e)))?;

        let tokenizer = tokenizers::Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| SetupError::ModelUnavailable(format!("tokenizer error: {}", e)))?;

        tracing::info!(
            model = %config.model_path.display(),
            max_length = config.max_length,
            "Loaded ONNX sentiment model"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            config,
        })
    }

    /// Runs the model and returns (negative, positive) logits.
    fn logits(&self, ids: &[u32]) -> Result<(f32, f32), CapabilityError> {
        use ort::value::Tensor;

        let seq_len = ids.len().min(self.config.max_length);
        let input_ids: Vec<i64> = ids[..seq_len].iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = vec![1; seq_len];

        let to_tensor = |data: Vec<i64>| {
            Tensor::from_array(([1, seq_len], data.into_boxed_slice()))
                .map_err(|e| CapabilityError::Inference(e.to_string()))
        };
        let input_ids_tensor = to_tensor(input_ids)?;
        let attention_mask_tensor = to_tensor(attention_mask)?;

        let mut session = self.session.lock();
        let outputs = if self.config.token_type_ids {
            let token_type_tensor = to_tensor(vec![0; seq_len])?;
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_tensor
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])
        }
        .map_err(|e| CapabilityError::Inference(e.to_string()))?;

        let (shape, data) = outputs["logits"]
            .try_extract_tensor::<f32>()
            .map_err(|e| CapabilityError::Inference(format!("failed to extract logits: {}", e)))?;

        let dims: Vec<_> = shape.iter().collect();
        if dims.len() != 2 || *dims[0] != 1 || *dims[1] != 2 {
            return Err(CapabilityError::Inference(format!(
                "unexpected output shape: {:?}",
                dims
            )));
        }

        Ok((data[0], data[1]))
    }
}

#[cfg(feature = "ml")]
impl Tokenizer for OnnxSentimentModel {
    fn tokenize(&self, text: &str) -> Result<TokenSequence, CapabilityError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CapabilityError::Tokenizer(e.to_string()))?;
        Ok(TokenSequence {
            pieces: encoding.get_tokens().to_vec(),
            ids: encoding.get_ids().to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(feature = "ml")]
impl SentimentModel for OnnxSentimentModel {
    fn classify(&self, tokens: &TokenSequence) -> Result<Prediction, CapabilityError> {
        if tokens.ids.is_empty() {
            return Err(CapabilityError::Inference(
                "token sequence has no vocabulary ids".to_string(),
            ));
        }
        let (logit_negative, logit_positive) = self.logits(&tokens.ids)?;
        let (negative, positive) = softmax(logit_negative, logit_positive);
        let prediction = Prediction::from_probabilities(negative, positive);
        tracing::debug!(
            negative,
            positive,
            polarity = ?prediction.polarity,
            "Raw model output"
        );
        Ok(prediction)
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Loads the ONNX model with optimizations.
#[cfg(feature = "ml")]
fn build_session(path: &Path) -> ort::Result<ort::session::Session> {
    use ort::session::{builder::GraphOptimizationLevel, Session};

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(1)?
        .commit_from_file(path)?;
    Ok(session)
}

/// Computes softmax for two values.
#[cfg(feature = "ml")]
fn softmax(a: f32, b: f32) -> (f32, f32) {
    let max = a.max(b);
    let exp_a = (a - max).exp();
    let exp_b = (b - max).exp();
    let sum = exp_a + exp_b;
    (exp_a / sum, exp_b / sum)
}

/// Stub model when the ML feature is not enabled.
///
/// Loading always fails, so callers fall back to another model.
#[cfg(not(feature = "ml"))]
pub struct OnnxSentimentModel {
    _config: OnnxModelConfig,
}

#[cfg(not(feature = "ml"))]
impl OnnxSentimentModel {
    /// Loads the model (ML feature not enabled).
    pub fn load(_config: OnnxModelConfig) -> Result<Self, SetupError> {
        Err(SetupError::ModelUnavailable(
            "ML feature not enabled - rebuild with --features ml".to_string(),
        ))
    }
}

#[cfg(not(feature = "ml"))]
impl Tokenizer for OnnxSentimentModel {
    fn tokenize(&self, _text: &str) -> Result<TokenSequence, CapabilityError> {
        Err(CapabilityError::Tokenizer("ML feature not enabled".to_string()))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(not(feature = "ml"))]
impl SentimentModel for OnnxSentimentModel {
    fn classify(&self, _tokens: &TokenSequence) -> Result<Prediction, CapabilityError> {
        Err(CapabilityError::Inference("ML feature not enabled".to_string()))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
