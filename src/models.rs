use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// A labeled review from the dataset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRecord {
    /// Row identifier from the source dataset
    pub id: u64,
    /// Review body
    pub text: String,
    /// Ground-truth star rating (1 to 5)
    #[serde(rename = "rating")]
    pub true_rating: u8,
}

/// Outcome of a single model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Raw completion text, empty when the call fell back
    pub raw_text: String,
    /// Whether the call produced a response at all
    pub succeeded: bool,
}

impl CompletionResult {
    /// The defined fallback: empty text, not a propagated error
    pub fn fallback() -> Self {
        Self {
            raw_text: String::new(),
            succeeded: false,
        }
    }
}

/// What the parser made of a completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsedPrediction {
    /// Well-formed JSON object carrying a rating in range
    Valid { rating: u8 },
    /// Some text came back but not strict JSON; a rating may still
    /// have been scavenged leniently
    Malformed { rating: Option<u8> },
    /// Nothing to parse (fallback response)
    Empty,
}

impl ParsedPrediction {
    pub fn predicted_rating(&self) -> Option<u8> {
        match self {
            Self::Valid { rating } => Some(*rating),
            Self::Malformed { rating } => *rating,
            Self::Empty => None,
        }
    }

    /// Strict structural validity only
    pub fn is_valid_json(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Full record of one (strategy, review) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResult {
    pub strategy: Strategy,
    pub review_id: u64,
    pub true_rating: u8,
    pub completion: CompletionResult,
    pub prediction: ParsedPrediction,
}

/// Aggregated metrics for one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub strategy: Strategy,
    /// Exact matches over all sampled reviews (absent predictions count as wrong)
    pub accuracy: f64,
    /// Strictly well-formed responses over all attempted calls
    pub json_validity: f64,
    /// Calls that returned anything at all over all attempted calls
    pub reliability: f64,
}

/// Everything a run produces: the comparison table plus per-pair detail
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResults {
    pub metrics: Vec<MetricRecord>,
    pub results: Vec<PairResult>,
}
