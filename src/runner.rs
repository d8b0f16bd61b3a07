use anyhow::{Context, Result};
use std::path::Path;

use crate::client::CompletionClient;
use crate::config::RunConfig;
use crate::models::{PairResult, ReviewRecord, RunResults};
use crate::strategy::Strategy;
use crate::{dataset, evaluator, parser};

/// Orchestrates the evaluation: sample the dataset, then run every review
/// through every strategy and aggregate per-strategy metrics.
pub struct Runner {
    config: RunConfig,
    client: CompletionClient,
    verbose: bool,
}

impl Runner {
    pub fn new(config: RunConfig, verbose: bool) -> Self {
        let client = CompletionClient::new(&config);
        Self {
            config,
            client,
            verbose,
        }
    }

    /// Run the full evaluation and return the comparison plus per-pair detail
    pub async fn run(&mut self) -> Result<RunResults> {
        let dataset = dataset::load_reviews(Path::new(&self.config.dataset_path))?;
        let sample =
            dataset::sample_reviews(&dataset, self.config.sample_size, self.config.seed)?;

        if self.client.is_fallback_mode() {
            eprintln!(
                "Warning: {} not set; every call will use the fallback response",
                self.config.env_var_api_key
            );
        }

        if self.verbose {
            println!(
                "Sampled {} of {} reviews (seed {})",
                sample.len(),
                dataset.len(),
                self.config.seed
            );
        }

        let mut metrics = Vec::with_capacity(Strategy::ALL.len());
        let mut results = Vec::with_capacity(sample.len() * Strategy::ALL.len());

        for strategy in Strategy::ALL {
            let pairs = self.process_strategy(strategy, &sample).await;
            metrics.push(evaluator::evaluate(strategy, &pairs));
            results.extend(pairs);
        }

        let run_results = RunResults { metrics, results };

        if let Some(storage_path) = self.config.storage_path.clone() {
            if self.verbose {
                println!("Storing results to {}", storage_path);
            }
            self.store_results(&run_results, &storage_path)?;
        }

        Ok(run_results)
    }

    /// Run one strategy over the whole sample, one call per review
    async fn process_strategy(
        &mut self,
        strategy: Strategy,
        sample: &[ReviewRecord],
    ) -> Vec<PairResult> {
        let total = sample.len();
        let mut pairs = Vec::with_capacity(total);

        for (index, review) in sample.iter().enumerate() {
            if self.verbose {
                println!(
                    "  → {} review {}/{}",
                    strategy.name(),
                    index + 1,
                    total
                );
            }

            let request = strategy.build_request(review);
            let completion = self.client.complete(&request).await;
            let prediction = parser::parse(&completion);

            pairs.push(PairResult {
                strategy,
                review_id: review.id,
                true_rating: review.true_rating,
                completion,
                prediction,
            });
        }

        pairs
    }

    /// Store results to a JSON file, creating parent directories as needed
    fn store_results(&self, run_results: &RunResults, path: &str) -> Result<()> {
        let json_content = serde_json::to_string_pretty(run_results)
            .context("Failed to serialize results to JSON")?;

        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, json_content)
            .with_context(|| format!("Failed to write results to: {}", path))
    }
}
