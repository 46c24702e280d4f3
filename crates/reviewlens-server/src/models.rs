//! API request and response models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reviewlens_core::{
    AnalysisError, AnalysisResult, BatchEntry, BatchResult, FilterHealth, FilterVerdict,
    HealthSnapshot, ItemOutcome, ReviewItem, SentimentHealth,
};

/// Request body for POST /analyze.
pub type AnalyzeRequest = ReviewItem;

/// Request body for POST /analyze/batch.
///
/// Reviews are kept as raw JSON so that one malformed entry is reported in
/// place rather than rejecting the whole request.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Reviews to analyze (1 to 100).
    pub reviews: Vec<Value>,
}

impl BatchRequest {
    /// Reads each raw review, marking unreadable ones as malformed.
    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.reviews.into_iter().map(parse_entry).collect()
    }
}

fn parse_entry(value: Value) -> BatchEntry {
    let review_id = value.get("review_id").and_then(Value::as_i64);
    match serde_json::from_value::<ReviewItem>(value) {
        Ok(item) => BatchEntry::Review(item),
        Err(e) => BatchEntry::Malformed {
            review_id,
            reason: format!("malformed review: {}", e),
        },
    }
}

/// Error detail for a failed batch item.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemError {
    pub code: String,
    pub message: String,
}

impl From<&AnalysisError> for ItemError {
    fn from(error: &AnalysisError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// One entry of a batch response, in request order.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItemResponse {
    Analyzed(AnalysisResult),
    Failed {
        review_id: Option<i64>,
        error: ItemError,
        /// Filter verdict computed before scoring failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<FilterVerdict>,
    },
}

impl From<ItemOutcome> for BatchItemResponse {
    fn from(outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Analyzed(result) => BatchItemResponse::Analyzed(result),
            ItemOutcome::Failed {
                review_id,
                error,
                filter,
            } => BatchItemResponse::Failed {
                review_id,
                error: ItemError::from(&error),
                filter,
            },
        }
    }
}

/// Response body for POST /analyze/batch.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItemResponse>,
    /// Number of reviews in the request.
    pub total: usize,
    /// Number of analyzed reviews that are not appropriate.
    pub inappropriate_count: usize,
}

impl From<BatchResult> for BatchResponse {
    fn from(batch: BatchResult) -> Self {
        Self {
            total: batch.total,
            inappropriate_count: batch.inappropriate_count,
            results: batch.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sentiment: SentimentHealth,
    pub filter: FilterHealth,
}

impl From<HealthSnapshot> for HealthResponse {
    fn from(snapshot: HealthSnapshot) -> Self {
        Self {
            status: "healthy",
            sentiment: snapshot.sentiment,
            filter: snapshot.filter,
        }
    }
}
