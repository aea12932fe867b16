//! fmom CLI binary.
//!
//! Computes factor momentum alpha tables per date split and λ.

use clap::{Parser, Subcommand, ValueEnum};
use fmom::output::{AlphaWriter, ExportFormat};
use fmom::{AlphaPipeline, Settings, lambda_for_half_life};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fmom")]
#[command(about = "Factor momentum alphas", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON settings file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute alpha tables for a split
    Compute {
        /// Date split name
        #[arg(long)]
        split: String,

        /// Single λ (default: the full grid)
        #[arg(long = "lambda")]
        lambda: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Parquet)]
        format: Format,

        /// Override the output root
        #[arg(long)]
        output_root: Option<PathBuf>,
    },

    /// Show the λ grid
    Grid,

    /// Print the effective configuration as JSON
    ShowConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Parquet,
    Csv,
    Json,
    PrettyJson,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Parquet => Self::Parquet,
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::PrettyJson => Self::PrettyJson,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::from_json_file(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Compute {
            split,
            lambda,
            format,
            output_root,
        } => compute(&settings, &split, lambda, format.into(), output_root)?,
        Commands::Grid => print_grid(&settings),
        Commands::ShowConfig => println!("{}", serde_json::to_string_pretty(&settings)?),
    }

    Ok(())
}

fn compute(
    settings: &Settings,
    split_name: &str,
    lambda: Option<f64>,
    format: ExportFormat,
    output_root: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let split = settings.split(split_name)?;
    let lambdas = lambda.map_or_else(|| settings.grid.lambdas(), |l| vec![l]);
    let pipeline = AlphaPipeline::new(settings.alpha)?;
    let store = settings.paths.store();
    let writer = AlphaWriter::new(
        output_root.unwrap_or_else(|| settings.paths.output_root.clone()),
        format,
    );

    println!("Split: {} ({} to {})", split.name, split.start, split.end);
    println!("Computing alphas for {} lambda value(s)...\n", lambdas.len());

    let inputs = pipeline.load_inputs(&store, split)?;

    let pb = ProgressBar::new(lambdas.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    for lambda in lambdas {
        let pipeline = pipeline.with_lambda(lambda)?;
        pb.set_message(format!("λ={lambda:.6}"));

        let mut output = pipeline.run_prepared(&inputs, &store, split)?;
        let path = writer.write(&split.name, lambda, &mut output.table)?;
        info!(path = %path.display(), rows = output.summary.rows, "wrote alpha table");

        pb.println(format!("{}\n  → {}\n", output.summary, path.display()));
        pb.inc(1);
    }

    pb.finish_with_message("done");
    Ok(())
}

fn print_grid(settings: &Settings) {
    println!("{:>10}  {:>10}  signal", "half-life", "lambda");
    for &half_life in settings.grid.half_lives() {
        let lambda = lambda_for_half_life(half_life);
        println!(
            "{:>10.0}  {:>10.6}  {}",
            half_life,
            lambda,
            fmom::output::signal_name(lambda)
        );
    }
}
