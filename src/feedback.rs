use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::client::CompletionClient;

/// One recorded customer review with its AI-generated companions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub timestamp: DateTime<Utc>,
    pub rating: u8,
    pub review: String,
    pub ai_response: String,
    pub summary: String,
    pub actions: String,
}

/// Append-only CSV store for submissions
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all submissions; a missing file is an empty store
    pub fn load(&self) -> Result<Vec<Submission>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open store: {}", self.path.display()))?;

        let mut submissions = Vec::new();
        for record in reader.deserialize() {
            let submission: Submission = record
                .with_context(|| format!("Malformed row in {}", self.path.display()))?;
            submissions.push(submission);
        }
        Ok(submissions)
    }

    /// Append one submission, writing the header if the file is new
    pub fn append(&self, submission: &Submission) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open store: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer
            .serialize(submission)
            .context("Failed to write submission")?;
        writer.flush().context("Failed to flush store")?;
        Ok(())
    }
}

/// Prompt sent for the customer-facing reply
pub fn reply_prompt(rating: u8, review: &str) -> String {
    format!(
        "Write a brief friendly response a restaurant would send to a customer \
         who left this review (one short paragraph):\n\nRating: {}\nReview: \"{}\"",
        rating, review
    )
}

/// Prompt sent for the one-sentence summary
pub fn summary_prompt(review: &str) -> String {
    format!(
        "Summarize the following review in one short sentence:\n\n\"{}\"",
        review
    )
}

/// Prompt sent for the recommended actions
pub fn actions_prompt(review: &str, rating: u8) -> String {
    format!(
        "Suggest 3 concise, actionable recommendations the restaurant owner \
         should do based on this review. Provide bullet points only.\n\n\
         Rating: {}\nReview: \"{}\"",
        rating, review
    )
}

fn fallback_reply() -> String {
    "Thanks for your review! We appreciate your feedback.".to_string()
}

/// Review truncated to 160 characters
fn fallback_summary(review: &str) -> String {
    let truncated: String = review.chars().take(160).collect();
    if review.chars().count() > 160 {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

fn fallback_actions() -> String {
    "- Thank the customer\n- Investigate the issue\n- Improve service based on feedback"
        .to_string()
}

/// Record a review: generate reply, summary, and actions (substituting
/// deterministic fallbacks when a call falls back) and append to the store.
pub async fn submit(
    client: &mut CompletionClient,
    store: &SubmissionStore,
    rating: u8,
    review: &str,
) -> Result<Submission> {
    if review.trim().is_empty() {
        bail!("Review cannot be empty");
    }

    let reply = client.complete(&reply_prompt(rating, review)).await;
    let summary = client.complete(&summary_prompt(review)).await;
    let actions = client.complete(&actions_prompt(review, rating)).await;

    let submission = Submission {
        timestamp: Utc::now(),
        rating,
        review: review.to_string(),
        ai_response: usable_or(reply.raw_text, fallback_reply),
        summary: usable_or(summary.raw_text, || fallback_summary(review)),
        actions: usable_or(actions.raw_text, fallback_actions),
    };

    store.append(&submission)?;
    Ok(submission)
}

fn usable_or(raw_text: String, fallback: impl FnOnce() -> String) -> String {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_string()
    }
}

/// Filters mirroring the admin view: keep listed ratings, optional
/// case-insensitive substring match on the review text
pub fn filter_submissions(
    submissions: &[Submission],
    ratings: &[u8],
    search: Option<&str>,
) -> Vec<Submission> {
    submissions
        .iter()
        .filter(|s| ratings.is_empty() || ratings.contains(&s.rating))
        .filter(|s| match search {
            Some(needle) => s.review.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        })
        .cloned()
        .collect()
}

/// Aggregate view over a set of submissions
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub mean_rating: f64,
    /// Count of submissions per star, index 0 = one star
    pub counts: [usize; 5],
}

pub fn compute_stats(submissions: &[Submission]) -> FeedbackStats {
    let total = submissions.len();
    let mut counts = [0usize; 5];
    let mut sum = 0u64;

    for submission in submissions {
        sum += submission.rating as u64;
        if (1..=5).contains(&submission.rating) {
            counts[submission.rating as usize - 1] += 1;
        }
    }

    FeedbackStats {
        total,
        mean_rating: if total == 0 {
            0.0
        } else {
            sum as f64 / total as f64
        },
        counts,
    }
}

/// Print the report the way an admin would read it
pub fn print_report(stats: &FeedbackStats, submissions: &[Submission]) {
    println!("Total submissions: {}", stats.total);
    println!("Average rating:    {:.2}", stats.mean_rating);
    for (index, count) in stats.counts.iter().enumerate() {
        println!("  {} star: {}", index + 1, count);
    }

    if submissions.is_empty() {
        println!("\nNo submissions match.");
        return;
    }

    println!();
    for submission in submissions {
        println!(
            "[{}] {}* {}",
            submission.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            submission.rating,
            submission.review
        );
        println!("    summary: {}", submission.summary);
    }
}
