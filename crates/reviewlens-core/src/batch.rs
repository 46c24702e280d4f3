//! Batch analysis with order preservation and per-item error isolation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::filter::FilterVerdict;
use crate::scorer::{SentimentLabel, SentimentVerdict};

/// Maximum number of reviews in one batch.
pub const MAX_BATCH_SIZE: usize = 100;

/// A review submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Caller-assigned identifier; uniqueness is not checked.
    pub review_id: i64,
    pub content: String,
}

impl ReviewItem {
    /// Creates a review item.
    pub fn new(review_id: i64, content: impl Into<String>) -> Self {
        Self {
            review_id,
            content: content.into(),
        }
    }
}

/// Analysis of one review: both verdicts under the caller's ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub review_id: i64,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f32,
    pub is_appropriate: bool,
    pub inappropriate_reasons: Vec<String>,
}

impl AnalysisResult {
    /// Assembles a result from the two verdicts.
    pub fn new(review_id: i64, sentiment: SentimentVerdict, filter: FilterVerdict) -> Self {
        Self {
            review_id,
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            is_appropriate: filter.is_appropriate,
            inappropriate_reasons: filter.reasons,
        }
    }
}

/// A batch entry as received: a readable review, or one that could not be
/// read and is reported in place as `InvalidInput`.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Review(ReviewItem),
    Malformed {
        /// Present when the entry carried a usable ID.
        review_id: Option<i64>,
        reason: String,
    },
}

impl From<ReviewItem> for BatchEntry {
    fn from(item: ReviewItem) -> Self {
        BatchEntry::Review(item)
    }
}

/// Failure of one item, with the filter verdict when it was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    pub error: AnalysisError,
    pub filter: Option<FilterVerdict>,
}

impl ItemFailure {
    /// Failure after the filter ran but scoring did not complete.
    pub fn with_filter(error: AnalysisError, filter: FilterVerdict) -> Self {
        Self {
            error,
            filter: Some(filter),
        }
    }
}

impl From<AnalysisError> for ItemFailure {
    fn from(error: AnalysisError) -> Self {
        Self {
            error,
            filter: None,
        }
    }
}

/// Outcome for one item of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Analyzed(AnalysisResult),
    Failed {
        review_id: Option<i64>,
        error: AnalysisError,
        /// Filter verdict computed before the failure, if any.
        filter: Option<FilterVerdict>,
    },
}

impl ItemOutcome {
    /// The review ID this outcome belongs to, if the item carried one.
    pub fn review_id(&self) -> Option<i64> {
        match self {
            ItemOutcome::Analyzed(result) => Some(result.review_id),
            ItemOutcome::Failed { review_id, .. } => *review_id,
        }
    }

    /// Returns the result if the item was analyzed.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ItemOutcome::Analyzed(result) => Some(result),
            ItemOutcome::Failed { .. } => None,
        }
    }

    /// Returns the error if the item failed.
    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            ItemOutcome::Analyzed(_) => None,
            ItemOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Returns the filter verdict of a failed item, if it was computed.
    pub fn failed_filter(&self) -> Option<&FilterVerdict> {
        match self {
            ItemOutcome::Analyzed(_) => None,
            ItemOutcome::Failed { filter, .. } => filter.as_ref(),
        }
    }

    /// True if the item was analyzed and found inappropriate.
    pub fn is_inappropriate(&self) -> bool {
        self.result().is_some_and(|r| !r.is_appropriate)
    }
}

/// Ordered batch outcome with summary counts.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// One outcome per input item, in input order.
    pub results: Vec<ItemOutcome>,
    /// Number of input items.
    pub total: usize,
    /// Number of analyzed items that are not appropriate.
    pub inappropriate_count: usize,
}

impl BatchResult {
    fn from_outcomes(results: Vec<ItemOutcome>) -> Self {
        let inappropriate_count = results.iter().filter(|o| o.is_inappropriate()).count();
        Self {
            total: results.len(),
            inappropriate_count,
            results,
        }
    }

    /// Number of items that failed.
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|o| o.error().is_some()).count()
    }
}

/// Analyzes a single review.
pub trait ItemAnalyzer {
    fn analyze_item(
        &self,
        review_id: i64,
        content: &str,
    ) -> std::result::Result<AnalysisResult, ItemFailure>;
}

/// Validates a batch and runs each item through an [`ItemAnalyzer`].
///
/// Items run one after another in input order. A failing item is recorded in
/// place and does not stop its siblings.
#[derive(Debug, Clone, Copy)]
pub struct BatchCoordinator {
    max_items: usize,
}

impl BatchCoordinator {
    /// Creates a coordinator with the default size limit.
    pub fn new() -> Self {
        Self {
            max_items: MAX_BATCH_SIZE,
        }
    }

    /// Maximum accepted batch size.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Checks the batch size precondition.
    pub fn validate(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(AnalysisError::EmptyBatch);
        }
        if len > self.max_items {
            return Err(AnalysisError::BatchTooLarge {
                len,
                max: self.max_items,
            });
        }
        Ok(())
    }

    /// Analyzes every item, preserving order.
    pub fn run<A>(&self, analyzer: &A, items: &[ReviewItem]) -> Result<BatchResult>
    where
        A: ItemAnalyzer + ?Sized,
    {
        self.validate(items.len())?;
        let outcomes = items
            .iter()
            .map(|item| process(analyzer, item.review_id, &item.content))
            .collect();
        Ok(finish(outcomes))
    }

    /// Analyzes entries that may include malformed items, preserving order.
    ///
    /// Malformed entries count toward the size limit and `total` and fail in
    /// place with `InvalidInput`.
    pub fn run_entries<A>(&self, analyzer: &A, entries: &[BatchEntry]) -> Result<BatchResult>
    where
        A: ItemAnalyzer + ?Sized,
    {
        self.validate(entries.len())?;
        let outcomes = entries
            .iter()
            .map(|entry| match entry {
                BatchEntry::Review(item) => process(analyzer, item.review_id, &item.content),
                BatchEntry::Malformed { review_id, reason } => {
                    warn!(review_id = ?review_id, reason = %reason, "Malformed batch item");
                    ItemOutcome::Failed {
                        review_id: *review_id,
                        error: AnalysisError::InvalidInput(reason.clone()),
                        filter: None,
                    }
                }
            })
            .collect();
        Ok(finish(outcomes))
    }
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn process<A>(analyzer: &A, review_id: i64, content: &str) -> ItemOutcome
where
    A: ItemAnalyzer + ?Sized,
{
    match analyzer.analyze_item(review_id, content) {
        Ok(result) => ItemOutcome::Analyzed(result),
        Err(ItemFailure { error, filter }) => {
            warn!(
                review_id,
                code = error.code(),
                error = %error,
                filter_reasons = ?filter.as_ref().map(|f| &f.reasons),
                "Batch item failed"
            );
            ItemOutcome::Failed {
                review_id: Some(review_id),
                error,
                filter,
            }
        }
    }
}

fn finish(outcomes: Vec<ItemOutcome>) -> BatchResult {
    let result = BatchResult::from_outcomes(outcomes);
    debug!(
        total = result.total,
        inappropriate = result.inappropriate_count,
        failed = result.failed_count(),
        "Batch complete"
    );
    result
}
