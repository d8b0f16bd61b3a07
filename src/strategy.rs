use serde::{Deserialize, Serialize};

use crate::models::ReviewRecord;

/// The three fixed prompt-construction methods under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ZeroShot,
    FewShot,
    Reasoned,
}

/// Fixed (text, rating) pairs prepended by the few-shot strategy
const FEW_SHOT_EXAMPLES: [(&str, u8); 3] = [
    ("The food was cold and the waiter ignored us all night.", 1),
    ("Decent portions, average taste. Nothing memorable.", 3),
    ("Absolutely fantastic! Best meal I've had in years.", 5),
];

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::ZeroShot, Strategy::FewShot, Strategy::Reasoned];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ZeroShot => "zero_shot",
            Strategy::FewShot => "few_shot",
            Strategy::Reasoned => "reasoned",
        }
    }

    /// Build the request string for one review. Deterministic: same review
    /// and strategy always produce the same prompt, with the review text
    /// embedded verbatim.
    pub fn build_request(&self, review: &ReviewRecord) -> String {
        match self {
            Strategy::ZeroShot => format!(
                "Predict the star rating (1-5) for the following review. \
                 Respond with strict JSON only, in the form {{\"rating\": <integer 1-5>}} \
                 with no extra text.\n\nReview: \"{}\"",
                review.text
            ),
            Strategy::FewShot => {
                let mut prompt = String::from(
                    "Predict the star rating (1-5) for a review. \
                     Respond with strict JSON only: {\"rating\": <integer 1-5>}.\n\n\
                     Examples:\n",
                );
                for (text, rating) in FEW_SHOT_EXAMPLES {
                    prompt.push_str(&format!(
                        "Review: \"{}\"\n{{\"rating\": {}}}\n\n",
                        text, rating
                    ));
                }
                prompt.push_str(&format!("Review: \"{}\"\n", review.text));
                prompt
            }
            Strategy::Reasoned => format!(
                "Read the following review and reason briefly about the customer's \
                 sentiment (one or two sentences). Then, on the final line, give your \
                 answer as JSON: {{\"rating\": <integer 1-5>}}.\n\nReview: \"{}\"",
                review.text
            ),
        }
    }
}
