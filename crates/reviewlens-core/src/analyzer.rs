//! Review analysis facade.
//!
//! Owns the normalizer, the sentiment scorer, the content filter, and the two
//! verdict caches held by those components. Everything the transport layer
//! needs goes through [`ReviewAnalyzer`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::batch::{
    AnalysisResult, BatchCoordinator, BatchEntry, BatchResult, ItemAnalyzer, ItemFailure,
    ReviewItem,
};
use crate::capability::{LexiconModel, RegexTokenizer, SentimentModel, Tokenizer};
use crate::config::AnalyzerConfig;
use crate::error::{Result, SetupError};
use crate::filter::{ContentFilter, SensitiveWordSet};
use crate::normalizer::Normalizer;
use crate::scorer::SentimentScorer;

/// Sentiment side of the health snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentHealth {
    pub threshold: f32,
    pub cache_size: usize,
}

/// Filter side of the health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterHealth {
    pub sensitive_words_count: usize,
    pub patterns_count: usize,
    pub cache_size: usize,
}

/// Point-in-time view of analyzer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub sentiment: SentimentHealth,
    pub filter: FilterHealth,
}

/// Entries dropped by [`ReviewAnalyzer::clear_all_caches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheClearReport {
    pub sentiment_cleared: usize,
    pub filter_cleared: usize,
}

/// Sentiment and appropriateness analysis for review text.
pub struct ReviewAnalyzer {
    normalizer: Normalizer,
    scorer: SentimentScorer,
    filter: ContentFilter,
    batch: BatchCoordinator,
}

impl ReviewAnalyzer {
    /// Builds an analyzer from configuration and injected capabilities.
    ///
    /// Fails if the threshold is out of range or the sensitive-word file
    /// cannot be loaded.
    pub fn new(
        config: &AnalyzerConfig,
        tokenizer: Arc<dyn Tokenizer>,
        model: Arc<dyn SentimentModel>,
    ) -> std::result::Result<Self, SetupError> {
        config.validate()?;

        let words = match &config.sensitive_words_path {
            Some(path) => SensitiveWordSet::load(path)?,
            None => SensitiveWordSet::builtin(),
        };

        info!(
            tokenizer = tokenizer.name(),
            model = model.name(),
            threshold = config.threshold,
            sensitive_words = words.words_count(),
            patterns = words.patterns_count(),
            "Review analyzer ready"
        );

        Ok(Self::from_parts(
            Normalizer::new(tokenizer),
            SentimentScorer::new(model, config.threshold)?,
            ContentFilter::new(words).with_min_content_chars(config.min_content_chars),
        ))
    }

    /// Builds an analyzer with the regex tokenizer and lexicon model.
    pub fn with_lexicon(config: &AnalyzerConfig) -> std::result::Result<Self, SetupError> {
        Self::new(
            config,
            Arc::new(RegexTokenizer::new()),
            Arc::new(LexiconModel::new()),
        )
    }

    /// Assembles an analyzer from already-built components.
    pub fn from_parts(normalizer: Normalizer, scorer: SentimentScorer, filter: ContentFilter) -> Self {
        Self {
            normalizer,
            scorer,
            filter,
            batch: BatchCoordinator::new(),
        }
    }

    /// Analyzes one review.
    ///
    /// The filter verdict is computed (and cached) even when scoring fails,
    /// but the call still fails in that case.
    pub fn analyze_one(&self, review_id: i64, content: &str) -> Result<AnalysisResult> {
        self.analyze_item(review_id, content).map_err(|failure| failure.error)
    }

    /// Analyzes 1 to 100 reviews, preserving input order.
    pub fn analyze_batch(&self, items: &[ReviewItem]) -> Result<BatchResult> {
        self.batch.run(self, items)
    }

    /// Like [`analyze_batch`](Self::analyze_batch), but malformed entries are
    /// reported in place instead of rejecting the batch.
    pub fn analyze_entries(&self, entries: &[BatchEntry]) -> Result<BatchResult> {
        self.batch.run_entries(self, entries)
    }

    /// Reports threshold, word-set sizes, and cache sizes.
    pub fn health_snapshot(&self) -> HealthSnapshot {
        let words = self.filter.words();
        HealthSnapshot {
            sentiment: SentimentHealth {
                threshold: self.scorer.threshold(),
                cache_size: self.scorer.cache_size(),
            },
            filter: FilterHealth {
                sensitive_words_count: words.words_count(),
                patterns_count: words.patterns_count(),
                cache_size: self.filter.cache_size(),
            },
        }
    }

    /// Empties both verdict caches.
    pub fn clear_all_caches(&self) -> CacheClearReport {
        let report = CacheClearReport {
            sentiment_cleared: self.scorer.clear_cache(),
            filter_cleared: self.filter.clear_cache(),
        };
        info!(
            sentiment = report.sentiment_cleared,
            filter = report.filter_cleared,
            "Cleared result caches"
        );
        report
    }
}

impl ItemAnalyzer for ReviewAnalyzer {
    fn analyze_item(
        &self,
        review_id: i64,
        content: &str,
    ) -> std::result::Result<AnalysisResult, ItemFailure> {
        let key = self.normalizer.key(content).inspect_err(|e| {
            warn!(review_id, error = %e, "Rejected review");
        })?;

        let filter = self.filter.filter(&key, content);
        match self
            .normalizer
            .tokens(content)
            .and_then(|tokens| self.scorer.score(&key, &tokens))
        {
            Ok(sentiment) => Ok(AnalysisResult::new(review_id, sentiment, filter)),
            Err(error) => Err(ItemFailure::with_filter(error, filter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::thread;

    use super::*;
    use crate::batch::ItemOutcome;
    use crate::capability::Polarity;
    use crate::error::AnalysisError;
    use crate::scorer::SentimentLabel;
    use crate::testing::MockModel;

    fn analyzer_with(model: Arc<MockModel>) -> ReviewAnalyzer {
        ReviewAnalyzer::new(
            &AnalyzerConfig::default(),
            Arc::new(RegexTokenizer::new()),
            model,
        )
        .unwrap()
    }

    #[test]
    fn end_to_end_positive_chinese_review() {
        let analyzer = analyzer_with(MockModel::returning(Polarity::Positive, 0.97));
        let result = analyzer.analyze_one(1, "这个产品非常好用，我很喜欢！").unwrap();

        assert_eq!(result.review_id, 1);
        assert_eq!(result.sentiment, SentimentLabel::Positive);
        assert_eq!(result.sentiment_score, 0.97);
        assert!(result.is_appropriate);
        assert!(result.inappropriate_reasons.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["is_appropriate"], true);
        assert_eq!(json["inappropriate_reasons"], serde_json::json!([]));
    }

    #[test]
    fn repeated_content_is_deterministic_and_cached() {
        let model = MockModel::returning(Polarity::Negative, 0.9);
        let analyzer = analyzer_with(model.clone());

        let first = analyzer.analyze_one(1, "太差了").unwrap();
        assert_eq!(analyzer.health_snapshot().sentiment.cache_size, 1);

        let second = analyzer.analyze_one(1, "太差了").unwrap();
        assert_eq!(first, second);
        assert_eq!(analyzer.health_snapshot().sentiment.cache_size, 1);
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn same_content_different_ids_share_cache_entries() {
        let model = MockModel::returning(Polarity::Positive, 0.8);
        let analyzer = analyzer_with(model.clone());

        let a = analyzer.analyze_one(1, "还可以").unwrap();
        let b = analyzer.analyze_one(2, "还可以").unwrap();

        assert_eq!(a.review_id, 1);
        assert_eq!(b.review_id, 2);
        assert_eq!(a.sentiment_score, b.sentiment_score);
        assert_eq!(model.calls(), 1);
        let health = analyzer.health_snapshot();
        assert_eq!(health.sentiment.cache_size, 1);
        assert_eq!(health.filter.cache_size, 1);
    }

    #[test]
    fn blank_content_is_invalid_input() {
        let analyzer = analyzer_with(MockModel::returning(Polarity::Positive, 0.9));
        assert!(matches!(
            analyzer.analyze_one(1, "  "),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert_eq!(analyzer.health_snapshot().filter.cache_size, 0);
    }

    #[test]
    fn scoring_failure_surfaces_but_filter_still_runs() {
        let analyzer = analyzer_with(MockModel::failing());
        assert!(matches!(
            analyzer.analyze_one(1, "赌博网站"),
            Err(AnalysisError::ScoringUnavailable(_))
        ));
        let health = analyzer.health_snapshot();
        assert_eq!(health.sentiment.cache_size, 0);
        assert_eq!(health.filter.cache_size, 1);
    }

    #[test]
    fn clear_all_caches_resets_sizes_and_forces_recompute() {
        let model = MockModel::returning(Polarity::Positive, 0.9);
        let analyzer = analyzer_with(model.clone());

        analyzer.analyze_one(1, "好评").unwrap();
        analyzer.analyze_one(2, "不错").unwrap();

        let report = analyzer.clear_all_caches();
        assert_eq!(report.sentiment_cleared, 2);
        assert_eq!(report.filter_cleared, 2);

        let health = analyzer.health_snapshot();
        assert_eq!(health.sentiment.cache_size, 0);
        assert_eq!(health.filter.cache_size, 0);

        analyzer.analyze_one(1, "好评").unwrap();
        assert_eq!(model.calls(), 3);
    }

    #[test]
    fn health_snapshot_reports_configuration() {
        let analyzer = analyzer_with(MockModel::returning(Polarity::Positive, 0.9));
        let health = analyzer.health_snapshot();
        assert_eq!(health.sentiment.threshold, 0.75);
        assert_eq!(health.filter.sensitive_words_count, 6);
        assert_eq!(health.filter.patterns_count, 3);
    }

    #[test]
    fn batch_preserves_order_across_hits_and_misses() {
        let analyzer = analyzer_with(MockModel::returning(Polarity::Positive, 0.9));
        analyzer.analyze_one(99, "B").unwrap();

        let items = vec![
            ReviewItem::new(1, "A"),
            ReviewItem::new(2, "B"),
            ReviewItem::new(3, "C"),
        ];
        let result = analyzer.analyze_batch(&items).unwrap();
        let ids: Vec<_> = result.results.iter().map(ItemOutcome::review_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn batch_isolates_failing_items() {
        let analyzer = analyzer_with(MockModel::failing_on(Polarity::Negative, 0.95, "坏"));
        let items = vec![
            ReviewItem::new(1, "诈骗店铺"),
            ReviewItem::new(2, "坏"),
            ReviewItem::new(3, ""),
            ReviewItem::new(4, "一般"),
        ];
        let result = analyzer.analyze_batch(&items).unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.inappropriate_count, 1);
        assert_eq!(
            result.results[1].error().map(AnalysisError::code),
            Some("scoring_unavailable")
        );
        assert_eq!(
            result.results[2].error().map(AnalysisError::code),
            Some("invalid_input")
        );
        let last = result.results[3].result().unwrap();
        assert_eq!(last.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn scoring_failure_in_batch_keeps_filter_verdict() {
        let analyzer = analyzer_with(MockModel::failing_on(Polarity::Negative, 0.95, "坏"));
        let items = vec![ReviewItem::new(1, "诈骗坏"), ReviewItem::new(2, "  ")];
        let result = analyzer.analyze_batch(&items).unwrap();

        let filter = result.results[0].failed_filter().unwrap();
        assert!(!filter.is_appropriate);
        assert_eq!(filter.reasons, vec!["sensitive_word:诈骗"]);
        assert!(result.results[1].failed_filter().is_none());
        assert_eq!(result.inappropriate_count, 0);
    }

    #[test]
    fn malformed_entries_do_not_block_siblings() {
        let model = MockModel::returning(Polarity::Positive, 0.9);
        let analyzer = analyzer_with(model.clone());
        let entries = vec![
            BatchEntry::from(ReviewItem::new(1, "很好")),
            BatchEntry::Malformed {
                review_id: Some(2),
                reason: "missing field `content`".to_string(),
            },
            BatchEntry::from(ReviewItem::new(3, "赌博")),
        ];
        let result = analyzer.analyze_entries(&entries).unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.inappropriate_count, 1);
        assert_eq!(result.results[0].result().unwrap().sentiment, SentimentLabel::Positive);
        assert_eq!(
            result.results[1].error().map(AnalysisError::code),
            Some("invalid_input")
        );
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn batch_bounds() {
        let analyzer = analyzer_with(MockModel::returning(Polarity::Positive, 0.9));
        let make = |n: usize| -> Vec<ReviewItem> {
            (0..n)
                .map(|i| ReviewItem::new(i as i64, format!("评论{i}")))
                .collect()
        };

        assert_eq!(analyzer.analyze_batch(&[]).unwrap_err(), AnalysisError::EmptyBatch);
        assert!(matches!(
            analyzer.analyze_batch(&make(101)),
            Err(AnalysisError::BatchTooLarge { len: 101, max: 100 })
        ));
        assert_eq!(analyzer.analyze_batch(&make(100)).unwrap().total, 100);
    }

    #[test]
    fn filter_reasons_follow_term_then_pattern_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"words": ["T1", "T2"], "patterns": [{{"name": "P1", "pattern": "\\d{{4}}"}}], "case_sensitive": true}}"#
        )
        .unwrap();
        let config = AnalyzerConfig::default().with_sensitive_words_path(file.path());
        let analyzer = ReviewAnalyzer::new(
            &config,
            Arc::new(RegexTokenizer::new()),
            MockModel::returning(Polarity::Positive, 0.9),
        )
        .unwrap();

        let result = analyzer.analyze_one(1, "T2 and T1 since 2024").unwrap();
        assert!(!result.is_appropriate);
        assert_eq!(
            result.inappropriate_reasons,
            vec!["sensitive_word:T1", "sensitive_word:T2", "pattern:P1"]
        );
    }

    #[test]
    fn missing_word_file_is_filter_unavailable() {
        let config = AnalyzerConfig::default().with_sensitive_words_path("/nonexistent/words.json");
        let result = ReviewAnalyzer::with_lexicon(&config);
        assert!(matches!(result, Err(SetupError::FilterUnavailable(_))));
    }

    #[test]
    fn invalid_threshold_is_rejected_at_startup() {
        let config = AnalyzerConfig::default().with_threshold(0.3);
        assert!(matches!(
            ReviewAnalyzer::with_lexicon(&config),
            Err(SetupError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn lexicon_analyzer_end_to_end() {
        let analyzer = ReviewAnalyzer::with_lexicon(&AnalyzerConfig::default()).unwrap();
        let result = analyzer.analyze_one(7, "这个产品非常好用，我很喜欢！").unwrap();
        assert_eq!(result.sentiment, SentimentLabel::Positive);
        assert!(result.is_appropriate);
    }

    #[test]
    fn concurrent_analysis_shares_caches() {
        let model = MockModel::returning(Polarity::Positive, 0.9);
        let analyzer = Arc::new(analyzer_with(model));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let analyzer = Arc::clone(&analyzer);
                thread::spawn(move || {
                    for i in 0..25 {
                        analyzer.analyze_one(t * 100 + i, &format!("评论 {}", i % 5)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(analyzer.health_snapshot().sentiment.cache_size, 5);
        assert_eq!(analyzer.health_snapshot().filter.cache_size, 5);
    }
}
