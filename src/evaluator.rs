use crate::models::{MetricRecord, PairResult};
use crate::strategy::Strategy;

/// Aggregate one strategy's pair results into a metric record.
///
/// All three metrics share the same denominator, the number of attempted
/// calls: an absent prediction counts as a wrong answer rather than being
/// excluded, so a strategy that rarely answers cannot score well on accuracy.
pub fn evaluate(strategy: Strategy, pairs: &[PairResult]) -> MetricRecord {
    let total = pairs.len();
    if total == 0 {
        return MetricRecord {
            strategy,
            accuracy: 0.0,
            json_validity: 0.0,
            reliability: 0.0,
        };
    }

    let mut correct = 0usize;
    let mut strictly_valid = 0usize;
    let mut answered = 0usize;

    for pair in pairs {
        if pair.prediction.predicted_rating() == Some(pair.true_rating) {
            correct += 1;
        }
        if pair.prediction.is_valid_json() {
            strictly_valid += 1;
        }
        if pair.completion.succeeded {
            answered += 1;
        }
    }

    MetricRecord {
        strategy,
        accuracy: correct as f64 / total as f64,
        json_validity: strictly_valid as f64 / total as f64,
        reliability: answered as f64 / total as f64,
    }
}
