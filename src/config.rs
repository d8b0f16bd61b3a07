use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an evaluation run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// OpenAI-compatible API endpoint
    pub api_endpoint: String,
    /// Environment variable name containing the API key
    pub env_var_api_key: String,
    /// Model to use for generating responses
    pub model: String,
    /// Path to the labeled review dataset (CSV with id,text,rating)
    pub dataset_path: String,
    /// Number of reviews to sample from the dataset
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Seed for the sampler
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Temperature for response generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens for response generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-call timeout in seconds before falling back
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rate limit for API requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit_rps: f64,
    /// Optional local path to store full run results as JSON
    #[serde(default)]
    pub storage_path: Option<String>,
}

fn default_sample_size() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

fn default_temperature() -> f64 {
    0.0
}

fn default_max_tokens() -> u32 {
    256
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_rate_limit() -> f64 {
    10.0
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}
