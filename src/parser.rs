use serde_json::Value;

use crate::models::{CompletionResult, ParsedPrediction};

/// Decode a completion into a prediction.
///
/// Strict pass first: the whole text, or a JSON object embedded in it (the
/// reasoned strategy ends its rationale with a JSON tail), must parse as an
/// object with an in-range integer `rating` field. Only that sets
/// `Valid`. Otherwise a lenient scan may still scavenge a rating from plain
/// text, recorded as `Malformed` so json_validity stays strict.
pub fn parse(result: &CompletionResult) -> ParsedPrediction {
    let text = result.raw_text.trim();
    if text.is_empty() {
        return ParsedPrediction::Empty;
    }

    if let Some(rating) = strict_rating(text) {
        return ParsedPrediction::Valid { rating };
    }

    ParsedPrediction::Malformed {
        rating: lenient_rating(text),
    }
}

fn strict_rating(text: &str) -> Option<u8> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(rating) = rating_field(&value) {
            return Some(rating);
        }
    }
    embedded_rating(text)
}

/// Locate a JSON object embedded in surrounding prose
fn embedded_rating(text: &str) -> Option<u8> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&text[start..=end]).ok()?;
    rating_field(&value)
}

fn rating_field(value: &Value) -> Option<u8> {
    let rating = value.as_object()?.get("rating")?.as_i64()?;
    u8::try_from(rating).ok().filter(|r| (1..=5).contains(r))
}

/// Last standalone digit in 1-5; multi-digit runs are never ratings
fn lenient_rating(text: &str) -> Option<u8> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 1)
        .filter_map(|token| token.parse::<u8>().ok())
        .filter(|rating| (1..=5).contains(rating))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(raw_text: &str) -> CompletionResult {
        CompletionResult {
            raw_text: raw_text.to_string(),
            succeeded: !raw_text.is_empty(),
        }
    }

    #[test]
    fn test_strict_json_rating() {
        let prediction = parse(&completion(r#"{"rating": 4}"#));
        assert_eq!(prediction, ParsedPrediction::Valid { rating: 4 });
        assert!(prediction.is_valid_json());
        assert_eq!(prediction.predicted_rating(), Some(4));
    }

    #[test]
    fn test_lenient_text_rating_is_not_strict() {
        let prediction = parse(&completion("I think this is great, rating: 4"));
        assert_eq!(prediction.predicted_rating(), Some(4));
        assert!(!prediction.is_valid_json());
    }

    #[test]
    fn test_fallback_response_is_empty() {
        let prediction = parse(&CompletionResult::fallback());
        assert_eq!(prediction, ParsedPrediction::Empty);
        assert_eq!(prediction.predicted_rating(), None);
        assert!(!prediction.is_valid_json());
    }

    #[test]
    fn test_reasoned_json_tail() {
        let text = "The reviewer praises the food but complains about the wait. \
                    Overall positive.\n{\"rating\": 4}";
        let prediction = parse(&completion(text));
        assert_eq!(prediction, ParsedPrediction::Valid { rating: 4 });
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let prediction = parse(&completion(r#"{"rating": 9}"#));
        assert!(!prediction.is_valid_json());
        assert_eq!(prediction.predicted_rating(), None);
    }

    #[test]
    fn test_json_without_rating_field() {
        let prediction = parse(&completion(r#"{"stars": 3}"#));
        assert!(!prediction.is_valid_json());
        // lenient scan still finds the 3
        assert_eq!(prediction.predicted_rating(), Some(3));
    }

    #[test]
    fn test_truncated_json_falls_through_to_lenient() {
        let prediction = parse(&completion(r#"{"rating": 4"#));
        assert!(!prediction.is_valid_json());
        assert_eq!(prediction.predicted_rating(), Some(4));
    }

    #[test]
    fn test_multi_digit_numbers_are_ignored() {
        let prediction = parse(&completion("Visited in 2023, no rating given."));
        assert_eq!(prediction.predicted_rating(), None);
        assert!(!prediction.is_valid_json());
    }

    #[test]
    fn test_lenient_takes_final_answer() {
        let prediction = parse(&completion("Started as a 2 but improved, final rating 4"));
        assert_eq!(prediction.predicted_rating(), Some(4));
    }

    #[test]
    fn test_non_integer_json_rating() {
        let prediction = parse(&completion(r#"{"rating": "four"}"#));
        assert!(!prediction.is_valid_json());
        assert_eq!(prediction.predicted_rating(), None);
    }
}
