use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::RunResults;

/// Output format options
#[derive(Debug, Clone, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Print the strategy comparison in the specified format
pub fn print_results(run_results: &RunResults, format: OutputFormat) {
    match format {
        OutputFormat::Plain => print_plain(run_results),
        OutputFormat::Json => print_json(run_results),
    }
}

fn print_plain(run_results: &RunResults) {
    println!(
        "{:<12} {:<10} {:<14} {:<12}",
        "Strategy", "Accuracy", "JSON validity", "Reliability"
    );
    println!("{}", "-".repeat(50));

    for record in &run_results.metrics {
        println!(
            "{:<12} {:<10.3} {:<14.3} {:<12.3}",
            record.strategy.name(),
            record.accuracy,
            record.json_validity,
            record.reliability
        );
    }
}

fn print_json(run_results: &RunResults) {
    match serde_json::to_string_pretty(&run_results.metrics) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results to JSON: {}", e),
    }
}
