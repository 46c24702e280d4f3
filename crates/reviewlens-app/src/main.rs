//! ReviewLens - sentiment and content-filter service for product reviews.
//!
//! Loads the analyzer (ONNX model when available, lexicon model otherwise)
//! and serves it over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reviewlens_core::{
    AnalyzerConfig, OnnxModelConfig, OnnxSentimentModel, ReviewAnalyzer, DEFAULT_MODEL_PATH,
    DEFAULT_THRESHOLD,
};
use reviewlens_server::{Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// ReviewLens - sentiment and content-filter service for product reviews
#[derive(Parser, Debug)]
#[command(name = "reviewlens", version, about)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "SERVICE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(long, env = "SERVICE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory containing model.onnx and tokenizer.json
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Confidence below which a review is labeled neutral
    #[arg(long, env = "SENTIMENT_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// JSON sensitive-word list (built-in list when omitted)
    #[arg(long, env = "SENSITIVE_WORDS_PATH")]
    sensitive_words: Option<PathBuf>,

    /// Flag reviews shorter than this many characters
    #[arg(long, env = "MIN_CONTENT_CHARS")]
    min_content_chars: Option<usize>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn analyzer_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default()
            .with_threshold(self.threshold)
            .with_model_path(&self.model_path);
        if let Some(path) = &self.sensitive_words {
            config = config.with_sensitive_words_path(path);
        }
        if let Some(chars) = self.min_content_chars {
            config = config.with_min_content_chars(chars);
        }
        config
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig::default()
            .with_host(&self.host)
            .with_port(self.port)
    }
}

/// Initialize console logging.
fn init_logging(args: &Args) {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,reviewlens={0},reviewlens_core={0},reviewlens_server={0}",
            log_level
        ))
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Builds the analyzer, preferring the ONNX model and falling back to the lexicon.
fn build_analyzer(config: &AnalyzerConfig) -> anyhow::Result<ReviewAnalyzer> {
    let analyzer = match OnnxSentimentModel::load(OnnxModelConfig::from_dir(&config.model_path)) {
        Ok(model) => {
            let model = Arc::new(model);
            ReviewAnalyzer::new(config, model.clone(), model)
        }
        Err(e) => {
            tracing::warn!("ONNX model unavailable, using lexicon model: {}", e);
            ReviewAnalyzer::with_lexicon(config)
        }
    };

    analyzer.context("failed to initialize review analyzer")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting ReviewLens");

    let analyzer = build_analyzer(&args.analyzer_config())?;
    let server = Server::new(args.server_config(), analyzer)?;
    server.run().await?;

    Ok(())
}
