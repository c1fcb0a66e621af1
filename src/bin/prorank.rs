#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use prorank::ahp::{self, ComparisonMatrix};
use prorank::analysis::{run_analysis, AnalysisRequest};
use prorank::schema::StoredAnalysis;
use prorank::store::AnalysisStore;

#[derive(Parser)]
#[command(name = "prorank", version, about = "AHP + Profile Matching decision calculator")]
struct Cli {
    /// Directory for saved analyses
    #[arg(long, global = true, default_value = "data")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive AHP weights and consistency from a comparison matrix JSON
    Ahp {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run the full pipeline from an analysis request JSON
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Also persist the result under this name
        #[arg(long)]
        save: Option<String>,
    },
    /// List saved analyses
    List,
    /// Print one saved analysis as JSON
    Show {
        name: String,
    },
    /// Delete a saved analysis
    Delete {
        name: String,
    },
}

/// Input shape for the `ahp` subcommand.
#[derive(Deserialize)]
struct AhpRequest {
    labels: Vec<String>,
    matrix: Vec<Vec<f64>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Ahp { input, out } => {
            let raw = fs::read_to_string(&input)?;
            let request: AhpRequest = serde_json::from_str(&raw)?;
            let matrix = ComparisonMatrix::from_rows(request.matrix)?;
            let result = ahp::compute(&matrix, &request.labels)?;
            fs::write(&out, serde_json::to_string_pretty(&result)?)?;
            let verdict = if result.consistency.is_consistent() {
                "consistent"
            } else {
                "inconsistent; revise the comparisons"
            };
            println!(
                "CR = {:.4} ({verdict}); wrote {}",
                result.consistency.cr,
                out.display()
            );
        }
        Commands::Run { input, out, save } => {
            let raw = fs::read_to_string(&input)?;
            let request: AnalysisRequest = serde_json::from_str(&raw)?;
            let output = run_analysis(&request)?;
            fs::write(&out, serde_json::to_string_pretty(&output)?)?;
            for result in &output.ranking {
                println!(
                    "{:>3}. {} ({:.4})",
                    result.ranking, result.name, result.final_score
                );
            }
            if let Some(name) = save {
                let store = AnalysisStore::new(&cli.store)?;
                store.save(&name, &StoredAnalysis::new(request, output))?;
                println!("saved as '{name}'");
            }
        }
        Commands::List => {
            let store = AnalysisStore::new(&cli.store)?;
            for name in store.list()? {
                println!("{name}");
            }
        }
        Commands::Show { name } => {
            let store = AnalysisStore::new(&cli.store)?;
            let stored = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Commands::Delete { name } => {
            let store = AnalysisStore::new(&cli.store)?;
            store.delete(&name)?;
            println!("deleted '{name}'");
        }
    }
    Ok(())
}
