use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod client;
mod config;
mod dataset;
mod evaluator;
mod feedback;
mod models;
mod output;
mod parser;
mod runner;
mod strategy;

use crate::client::CompletionClient;
use crate::config::RunConfig;
use crate::feedback::SubmissionStore;
use crate::output::OutputFormat;
use crate::runner::Runner;

/// Compare prompt strategies for predicting star ratings from review text
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the strategy evaluation defined in a TOML run file
    Eval {
        /// Path to the TOML configuration file
        run_file: PathBuf,

        /// Output format: plain or json
        #[arg(short, long, default_value = "plain")]
        output: OutputFormat,

        /// Verbose output - show progress for each API request
        #[arg(short, long)]
        verbose: bool,
    },
    /// Record and inspect customer feedback
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FeedbackCommand {
    /// Submit one review and store it with AI reply, summary, and actions
    Submit {
        /// Path to the TOML configuration file (for the model client)
        run_file: PathBuf,

        /// Star rating, 1 to 5
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// Review text
        #[arg(long)]
        review: String,

        /// CSV file holding submissions
        #[arg(long, default_value = "data/submissions.csv")]
        store: PathBuf,
    },
    /// Print aggregate statistics and matching submissions
    Report {
        /// CSV file holding submissions
        #[arg(long, default_value = "data/submissions.csv")]
        store: PathBuf,

        /// Only include these ratings (default: all)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Vec<u8>,

        /// Case-insensitive substring to match in review text
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Eval {
            run_file,
            output,
            verbose,
        } => {
            let config = RunConfig::from_file(&run_file)?;
            let mut runner = Runner::new(config, verbose);
            let results = runner.run().await?;
            output::print_results(&results, output);
        }
        Command::Feedback { command } => match command {
            FeedbackCommand::Submit {
                run_file,
                rating,
                review,
                store,
            } => {
                let config = RunConfig::from_file(&run_file)?;
                let mut client = CompletionClient::new(&config);
                let store = SubmissionStore::new(store);
                let submission = feedback::submit(&mut client, &store, rating, &review).await?;
                println!("Recorded. AI reply:\n{}", submission.ai_response);
            }
            FeedbackCommand::Report {
                store,
                rating,
                search,
            } => {
                let store = SubmissionStore::new(store);
                let submissions = store.load()?;
                let matching =
                    feedback::filter_submissions(&submissions, &rating, search.as_deref());
                let stats = feedback::compute_stats(&matching);
                feedback::print_report(&stats, &matching);
            }
        },
    }

    Ok(())
}
