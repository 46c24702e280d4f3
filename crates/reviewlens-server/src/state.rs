//! Application state for the API server.

use std::sync::Arc;

use reviewlens_core::{AnalyzerConfig, ReviewAnalyzer, SetupError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Review analyzer; internally synchronized, so no outer lock.
    pub analyzer: Arc<ReviewAnalyzer>,
}

impl AppState {
    /// Creates application state around an analyzer.
    pub fn new(analyzer: ReviewAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    /// Creates application state with the lexicon model and default config.
    pub fn with_lexicon() -> Result<Self, SetupError> {
        ReviewAnalyzer::with_lexicon(&AnalyzerConfig::default()).map(Self::new)
    }
}
