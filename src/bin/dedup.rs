//! CLI entry point: reads a roster CSV, runs `preprocessing`, and writes
//! `dup_pairs.csv`, `clusters.json`, `summary.json`, `merged.csv` to an
//! output directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use provider_roster::config::PipelineConfig;
use provider_roster::{csvio, preprocessing};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dedup", about = "Provider-roster deduplication and merge pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline over a roster CSV.
    Run {
        /// Path to the input roster CSV.
        #[arg(long)]
        roster: PathBuf,
        /// Directory that may contain ca.csv, ny.csv, npi.csv.
        #[arg(long, default_value = ".")]
        data_path: PathBuf,
        /// Directory the four output files are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Skip the years-in-practice outlier filter.
        #[arg(long)]
        no_outliers: bool,
        /// Opt in to worker-pool pair scoring above the parallel threshold.
        #[arg(long)]
        parallel: bool,
        /// Duplicate-acceptance threshold (default matches the pipeline driver's 0.72).
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    provider_roster::config::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            roster,
            data_path,
            out_dir,
            no_outliers,
            parallel,
            threshold,
        } => run(roster, data_path, out_dir, no_outliers, parallel, threshold),
    }
}

fn run(
    roster_path: PathBuf,
    data_path: PathBuf,
    out_dir: PathBuf,
    no_outliers: bool,
    parallel: bool,
    threshold: Option<f64>,
) -> Result<()> {
    let mut config = PipelineConfig::from_env();
    config.base_path = data_path;
    config.parallel = parallel || config.parallel;
    config.remove_outliers = !no_outliers;
    if let Some(t) = threshold {
        config.threshold = t;
    }

    let rows = csvio::read_roster(&roster_path)
        .with_context(|| format!("reading roster csv at {}", roster_path.display()))?;

    tracing::info!(rows = rows.len(), out_dir = %out_dir.display(), "invoking pipeline");

    let output = preprocessing(&rows, &config.base_path, config.remove_outliers, &config)
        .context("running the dedup/merge pipeline")?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    csvio::write_dup_pairs(&out_dir, &output).context("writing dup_pairs.csv")?;
    csvio::write_clusters(&out_dir, &output).context("writing clusters.json")?;
    csvio::write_summary(&out_dir, &output).context("writing summary.json")?;
    csvio::write_merged(&out_dir, &output).context("writing merged.csv")?;

    println!(
        "wrote {} duplicate pairs, {} clusters, {} merged rows to {}",
        output.dup_pairs.len(),
        output.clusters.len(),
        output.merged.len(),
        out_dir.display()
    );

    Ok(())
}
