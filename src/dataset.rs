use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;

use crate::models::ReviewRecord;

/// Load labeled reviews from a CSV file with header `id,text,rating`
pub fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut reviews = Vec::new();
    for record in reader.deserialize() {
        let review: ReviewRecord = record
            .with_context(|| format!("Malformed dataset row in {}", path.display()))?;
        if !(1..=5).contains(&review.true_rating) {
            bail!(
                "Review {} has rating {} outside 1-5",
                review.id,
                review.true_rating
            );
        }
        reviews.push(review);
    }
    Ok(reviews)
}

/// Draw a sample of exactly `n` reviews without replacement.
/// Deterministic for a given seed.
pub fn sample_reviews(dataset: &[ReviewRecord], n: usize, seed: u64) -> Result<Vec<ReviewRecord>> {
    if n > dataset.len() {
        bail!(
            "Sample size {} exceeds dataset size {}",
            n,
            dataset.len()
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    Ok(dataset.choose_multiple(&mut rng, n).cloned().collect())
}
